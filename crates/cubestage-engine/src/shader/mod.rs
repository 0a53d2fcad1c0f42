//! Shader loading: compile each stage, link the pair, reflect the interface.
//!
//! Everything here runs on the CPU through `naga`. A [`Program`] is what a
//! backend turns into GPU objects; it already knows its attribute locations
//! and uniform layout, so no driver round-trip is needed to query them.

mod compile;
mod error;
mod program;
mod source;

pub use compile::{compile, CompiledStage};
pub use error::ShaderError;
pub use program::{link, load_program, Attribute, Program, UniformBlock, UniformMember};
pub use source::{ShaderSource, ShaderStage};

/// Vertex attribute carrying xyz positions.
pub const POSITION: &str = "position";
/// Vertex attribute carrying rgba colors.
pub const COLOR: &str = "color";
