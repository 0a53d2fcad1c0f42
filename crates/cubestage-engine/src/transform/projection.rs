use glam::Mat4;

/// Vertical field of view of the perspective projection, in degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 45.0;

/// Near clip plane distance.
pub const Z_NEAR: f32 = 0.1;

/// Far clip plane distance.
pub const Z_FAR: f32 = 10.0;

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Callers reject empty canvases before asking.
    #[inline]
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Perspective projection for `canvas`: 45° vertical FOV, near 0.1, far 10.
pub fn perspective(canvas: CanvasSize) -> Mat4 {
    Mat4::perspective_rh(FIELD_OF_VIEW_DEG.to_radians(), canvas.aspect(), Z_NEAR, Z_FAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn aspect_is_width_over_height() {
        assert!((CanvasSize::new(800, 600).aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_canvas_detected() {
        assert!(CanvasSize::new(0, 600).is_empty());
        assert!(CanvasSize::new(800, 0).is_empty());
        assert!(!CanvasSize::new(1, 1).is_empty());
    }

    #[test]
    fn perspective_encodes_fov_and_aspect() {
        let m = perspective(CanvasSize::new(800, 600));
        let f = 1.0 / (FIELD_OF_VIEW_DEG.to_radians() / 2.0).tan();
        assert!((m.y_axis.y - f).abs() < 1e-5);
        assert!((m.x_axis.x - f / (4.0 / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn perspective_maps_clip_planes_to_unit_depth() {
        let m = perspective(CanvasSize::new(800, 600));

        let near = m * Vec4::new(0.0, 0.0, -Z_NEAR, 1.0);
        let far = m * Vec4::new(0.0, 0.0, -Z_FAR, 1.0);

        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_is_deterministic() {
        let a = perspective(CanvasSize::new(800, 600));
        let b = perspective(CanvasSize::new(800, 600));
        assert_eq!(a, b);
        assert_ne!(a, perspective(CanvasSize::new(600, 600)));
    }
}
