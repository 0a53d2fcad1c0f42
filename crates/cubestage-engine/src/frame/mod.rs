//! Per-frame command recording.
//!
//! The driver records a [`FrameList`] each tick and hands it to a
//! `RenderBackend`, which either replays it on the GPU or records it.

mod cmd;
mod list;

pub use cmd::{DrawCall, FrameCmd};
pub use list::FrameList;
