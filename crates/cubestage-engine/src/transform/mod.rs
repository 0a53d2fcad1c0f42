//! Model / view / projection transforms.
//!
//! Matrices are column-major `glam::Mat4`, the layout WGSL `mat4x4<f32>`
//! expects, so they upload without transposition.
//!
//! Convention:
//! - right-handed view space, camera at the origin looking down -Z
//! - clip-space depth in `[0, 1]` (wgpu), hence `perspective_rh`

mod projection;
mod rotation;

pub use projection::{perspective, CanvasSize, FIELD_OF_VIEW_DEG, Z_FAR, Z_NEAR};
pub use rotation::{Rotation, MODEL_OFFSET, ROTATION_STEP, X_ROTATION_DIVISOR};

use glam::Mat4;

/// Uniform block member holding the model matrix.
pub const MODEL_MATRIX: &str = "modelMatrix";
/// Uniform block member holding the view matrix.
pub const VIEW_MATRIX: &str = "viewMatrix";
/// Uniform block member holding the projection matrix.
pub const PROJECTION_MATRIX: &str = "projectionMatrix";

/// The three matrices uploaded to an animated program every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    /// Identity model and view around a fixed projection.
    pub fn new(projection: Mat4) -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection,
        }
    }

    /// Pairs each matrix with the uniform member name it is uploaded to.
    pub fn named(&self) -> [(&'static str, &Mat4); 3] {
        [
            (MODEL_MATRIX, &self.model),
            (VIEW_MATRIX, &self.view),
            (PROJECTION_MATRIX, &self.projection),
        ]
    }
}
