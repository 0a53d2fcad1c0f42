use winit::window::{Window, WindowId};

use crate::render::WgpuBackend;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

/// Context passed to `core::App::on_start`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `WgpuBackend<'w>`
pub struct StartCtx<'a, 'w> {
    pub window:  WindowCtx<'a>,
    pub backend: &'a mut WgpuBackend<'w>,
}

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a, 'w> {
    pub window:  WindowCtx<'a>,
    pub backend: &'a mut WgpuBackend<'w>,
}
