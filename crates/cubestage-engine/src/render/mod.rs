//! Rendering backends.
//!
//! The driver talks to a [`RenderBackend`]: [`WgpuBackend`] draws on the
//! window surface, [`RecordingBackend`] validates and records without a GPU.
//!
//! Convention:
//! - one vertex buffer per attribute, tightly packed `f32`
//! - buffer slot `i` holds the program's `i`-th bound input by location
//! - uniform blocks live in bind group 0

mod backend;
mod bind;
mod id;
mod layout;
mod recording;
mod wgpu_backend;

pub use backend::{FrameStatus, RenderBackend};
pub use bind::bind_attribute;
pub use id::{BufferId, ProgramId};
pub use layout::{AttributeBinding, AttributeLayout, ComponentType};
pub use recording::RecordingBackend;
pub use wgpu_backend::WgpuBackend;
