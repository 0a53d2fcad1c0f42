//! Cubestage engine crate.
//!
//! Shader loading, geometry, transforms and the frame driver for the demo
//! stages, plus the window + GPU runtime that hosts them.

pub mod device;
pub mod window;
pub mod core;

pub mod logging;
pub mod paint;
pub mod geometry;
pub mod transform;
pub mod shader;
pub mod frame;
pub mod render;
pub mod stage;
pub mod driver;
