use std::ops::Range;

use crate::paint::Color;
use crate::render::ProgramId;
use crate::transform::Transforms;

/// One draw over a contiguous vertex range of a program's bound buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

impl DrawCall {
    /// Draw every vertex from zero.
    #[inline]
    pub const fn full(program: ProgramId, vertex_count: u32) -> Self {
        Self {
            program,
            first_vertex: 0,
            vertex_count,
        }
    }

    #[inline]
    pub fn vertices(&self) -> Range<u32> {
        self.first_vertex..self.first_vertex.saturating_add(self.vertex_count)
    }
}

/// Backend-agnostic frame command stream.
///
/// Commands apply in order. A frame starts with exactly one `Clear`.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameCmd {
    /// Clear color, and depth when `depth` is set.
    Clear { color: Color, depth: Option<f32> },
    /// Later draws in this frame are depth tested and write depth.
    EnableDepthTest,
    /// Uploads the matrices into the program's uniform block.
    SetTransforms {
        program: ProgramId,
        transforms: Transforms,
    },
    Draw(DrawCall),
}
