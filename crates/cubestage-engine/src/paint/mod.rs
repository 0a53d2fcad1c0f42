//! Color values shared by clears and vertex color tables.

mod color;

pub use color::Color;
