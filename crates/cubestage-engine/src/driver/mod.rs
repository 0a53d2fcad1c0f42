//! Frame driver: one-time setup, then one recorded frame per tick.

mod renderer;

pub use renderer::{DriverState, Renderer};
