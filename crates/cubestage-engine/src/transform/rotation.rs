use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

/// Angle added to the rotation every frame, in radians.
pub const ROTATION_STEP: f32 = 0.1;

/// The X rotation runs at this fraction of the Y rotation.
pub const X_ROTATION_DIVISOR: f32 = 8.0;

/// Translation that pushes the model in front of the camera.
pub const MODEL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -7.0);

/// Per-frame rotation state of an animated model.
///
/// The angle stays in `[0, 2π)`; the X rotation is derived from the wrapped
/// angle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    angle: f32,
    step: f32,
}

impl Rotation {
    /// Starts at angle 0 with the given per-frame step.
    pub const fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    /// Current rotation about Y, in radians.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current rotation about X, in radians.
    #[inline]
    pub fn angle_x(&self) -> f32 {
        self.angle / X_ROTATION_DIVISOR
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Advances by one step, wrapping into `[0, 2π)`.
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.step).rem_euclid(TAU);
    }

    /// `translate(MODEL_OFFSET) · rotateY(angle) · rotateX(angle / 8)`.
    ///
    /// Translation is applied last to the vertex (leftmost factor), so the
    /// model spins about its own center before being pushed back.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(MODEL_OFFSET)
            * Mat4::from_rotation_y(self.angle)
            * Mat4::from_rotation_x(self.angle_x())
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new(ROTATION_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after(frames: u32) -> Rotation {
        let mut r = Rotation::default();
        for _ in 0..frames {
            r.advance();
        }
        r
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── angle ─────────────────────────────────────────────────────────────

    #[test]
    fn starts_at_zero() {
        let r = Rotation::default();
        assert_eq!(r.angle(), 0.0);
        assert_eq!(r.angle_x(), 0.0);
        assert_eq!(r.step(), ROTATION_STEP);
    }

    #[test]
    fn advances_by_step_per_frame() {
        for n in [1u32, 10, 25, 62] {
            let r = after(n);
            let expected = (0.1 * n as f32).rem_euclid(TAU);
            assert!(close(r.angle(), expected), "n={n}: {} vs {expected}", r.angle());
            assert!(close(r.angle_x(), expected / 8.0));
        }
    }

    #[test]
    fn wraps_past_full_turn() {
        // 0.1 * 70 = 7.0 rad, one full turn plus ~0.717.
        let r = after(70);
        assert!(r.angle() < TAU);
        assert!(close(r.angle(), 7.0 - TAU));
        assert!(close(r.angle_x(), (7.0 - TAU) / 8.0));
    }

    // ── model matrix ──────────────────────────────────────────────────────

    #[test]
    fn model_at_rest_is_pure_translation() {
        let m = Rotation::default().model_matrix();
        assert_eq!(m, Mat4::from_translation(MODEL_OFFSET));
    }

    #[test]
    fn model_rotates_about_own_center_then_translates() {
        let r = after(5);
        let m = r.model_matrix();

        // The model origin lands on the offset regardless of rotation.
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - MODEL_OFFSET).length() < 1e-5);

        let expected = Mat4::from_translation(MODEL_OFFSET)
            * Mat4::from_rotation_y(r.angle())
            * Mat4::from_rotation_x(r.angle_x());
        assert!(m.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn rotation_order_is_y_then_x_factor() {
        let r = after(7);
        let yx = Mat4::from_rotation_y(r.angle()) * Mat4::from_rotation_x(r.angle_x());
        let xy = Mat4::from_rotation_x(r.angle_x()) * Mat4::from_rotation_y(r.angle());
        let m = Mat4::from_translation(-MODEL_OFFSET) * r.model_matrix();
        assert!(m.abs_diff_eq(yx, 1e-5));
        assert!(!m.abs_diff_eq(xy, 1e-5));
    }
}
