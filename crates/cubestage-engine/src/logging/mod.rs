//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate only
//! talks to the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
