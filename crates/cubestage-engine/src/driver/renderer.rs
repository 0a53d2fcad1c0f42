use anyhow::{ensure, Context, Result};

use crate::frame::{DrawCall, FrameCmd, FrameList};
use crate::render::{bind_attribute, FrameStatus, ProgramId, RenderBackend};
use crate::shader::{load_program, COLOR, POSITION};
use crate::stage::Stage;
use crate::transform::{
    perspective, CanvasSize, Rotation, Transforms, MODEL_MATRIX, PROJECTION_MATRIX, VIEW_MATRIX,
};

/// Clear value for the depth buffer: the far plane.
const CLEAR_DEPTH: f32 = 1.0;

/// Lifecycle of a [`Renderer`].
///
/// `Idle` after setup, `Rendering` from the first presented frame on. There
/// is no terminal state; the host stops calling `tick`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverState {
    Idle,
    Rendering,
}

#[derive(Debug, Copy, Clone)]
struct Drawable {
    program: ProgramId,
    vertex_count: u32,
    has_transforms: bool,
}

/// Everything a stage needs between frames.
///
/// Created once against a backend, then ticked once per presented frame.
#[derive(Debug)]
pub struct Renderer {
    stage: Stage,
    state: DriverState,
    drawable: Option<Drawable>,
    rotation: Rotation,
    transforms: Transforms,
    frames: u64,
    list: FrameList,
}

impl Renderer {
    /// Loads the stage's program, uploads its geometry and binds `position`
    /// and `color`. The projection is derived here, once, from `canvas`.
    pub fn new<B: RenderBackend + ?Sized>(
        backend: &mut B,
        stage: Stage,
        canvas: CanvasSize,
    ) -> Result<Self> {
        ensure!(
            !canvas.is_empty(),
            "canvas {}x{} has no drawable area",
            canvas.width,
            canvas.height
        );

        let drawable = match stage.shaders() {
            None => None,
            Some((vertex, fragment)) => {
                let program = load_program(stage.name(), &vertex, &fragment)?;
                let mesh = stage
                    .mesh()?
                    .with_context(|| format!("stage `{stage}` has shaders but no geometry"))?;

                let id = backend.create_program(&program)?;
                let positions = backend.upload(&format!("{stage} positions"), &mesh.positions)?;
                let colors = backend.upload(&format!("{stage} colors"), &mesh.colors)?;
                bind_attribute(backend, id, &program, POSITION, positions, &mesh.positions)?;
                bind_attribute(backend, id, &program, COLOR, colors, &mesh.colors)?;

                let has_transforms = program.uniforms().is_some();
                if has_transforms {
                    for name in [MODEL_MATRIX, VIEW_MATRIX, PROJECTION_MATRIX] {
                        ensure!(
                            program.uniform(name).is_some(),
                            "program `{}` has no uniform `{name}`",
                            program.label()
                        );
                    }
                }

                Some(Drawable {
                    program: id,
                    vertex_count: mesh.vertex_count(),
                    has_transforms,
                })
            }
        };

        log::info!(
            "stage `{stage}` ready on {}x{} canvas ({} vertices)",
            canvas.width,
            canvas.height,
            drawable.map_or(0, |d| d.vertex_count)
        );

        Ok(Self {
            stage,
            state: DriverState::Idle,
            drawable,
            rotation: Rotation::default(),
            transforms: Transforms::new(perspective(canvas)),
            frames: 0,
            list: FrameList::new(),
        })
    }

    /// Records and submits one frame.
    ///
    /// The rotation advances only when the backend presents the frame; a
    /// skipped frame leaves the renderer unchanged.
    pub fn tick<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<FrameStatus> {
        let mut rotation = self.rotation;
        let mut transforms = self.transforms;
        if self.stage.animated() {
            rotation.advance();
            transforms.model = rotation.model_matrix();
        }

        let depth_test = self.stage.depth_test();
        self.list.clear();
        self.list.push(FrameCmd::Clear {
            color: self.stage.clear_color(),
            depth: depth_test.then_some(CLEAR_DEPTH),
        });
        if depth_test {
            self.list.push(FrameCmd::EnableDepthTest);
        }
        if let Some(drawable) = self.drawable {
            if drawable.has_transforms {
                self.list.push(FrameCmd::SetTransforms {
                    program: drawable.program,
                    transforms,
                });
            }
            self.list
                .push(FrameCmd::Draw(DrawCall::full(drawable.program, drawable.vertex_count)));
        }

        let status = backend.submit(&self.list)?;
        if status == FrameStatus::Presented {
            self.rotation = rotation;
            self.transforms = transforms;
            self.frames += 1;
            self.state = DriverState::Rendering;
            log::trace!("frame {} angle {:.3}", self.frames, self.rotation.angle());
        }
        Ok(status)
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Presented frames so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Matrices of the last presented frame.
    #[inline]
    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Commands of the most recent tick.
    #[inline]
    pub fn last_frame(&self) -> &FrameList {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;
    use crate::transform::{ROTATION_STEP, X_ROTATION_DIVISOR};
    use glam::Mat4;
    use std::f32::consts::TAU;

    const CANVAS: CanvasSize = CanvasSize::new(800, 600);

    fn run(stage: Stage, frames: usize) -> (RecordingBackend, Renderer) {
        let mut backend = RecordingBackend::new();
        let mut renderer = Renderer::new(&mut backend, stage, CANVAS).unwrap();
        for _ in 0..frames {
            assert_eq!(renderer.tick(&mut backend).unwrap(), FrameStatus::Presented);
        }
        (backend, renderer)
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn rotating_cube_draws_36_vertices_per_frame_with_depth_test() {
        let (backend, renderer) = run(Stage::RotatingCube, 10);

        let counts: Vec<u32> = backend.draw_calls().map(|d| d.vertex_count).collect();
        assert_eq!(counts, [36; 10]);
        assert!(backend.frames().iter().all(|f| f.depth_test_before_draws()));
        assert_eq!(renderer.frames(), 10);
        assert_eq!(renderer.state(), DriverState::Rendering);
    }

    #[test]
    fn static_cube_draws_36_vertices_with_depth_test() {
        let (backend, _) = run(Stage::Cube, 10);
        assert_eq!(backend.draw_calls().filter(|d| d.vertex_count == 36).count(), 10);
        for frame in backend.frames() {
            assert!(frame.depth_test_enabled());
            assert!(frame.depth_test_before_draws());
            assert_eq!(frame.clear_op().unwrap().1, Some(CLEAR_DEPTH));
        }
    }

    #[test]
    fn triangle_draws_3_vertices_without_depth() {
        let (backend, _) = run(Stage::Triangle, 10);
        let counts: Vec<u32> = backend.draw_calls().map(|d| d.vertex_count).collect();
        assert_eq!(counts, [3; 10]);
        assert!(backend.frames().iter().all(|f| !f.depth_test_enabled()));
    }

    #[test]
    fn clear_stage_draws_nothing() {
        let (backend, renderer) = run(Stage::Clear, 5);
        assert_eq!(backend.frames().len(), 5);
        assert_eq!(backend.draw_calls().count(), 0);
        assert_eq!(backend.program_count(), 0);
        assert_eq!(renderer.frames(), 5);
    }

    #[test]
    fn setup_binds_position_and_color() {
        let (backend, _) = run(Stage::RotatingCube, 0);
        let bindings = backend.bindings(ProgramId(0));
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].layout.components, 3);
        assert_eq!(bindings[1].layout.components, 4);
        assert_eq!(bindings[0].layout.stride, 0);
        assert_eq!(bindings[1].layout.offset, 0);
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn starts_idle_and_renders_after_first_frame() {
        let mut backend = RecordingBackend::new();
        let mut renderer = Renderer::new(&mut backend, Stage::Triangle, CANVAS).unwrap();
        assert_eq!(renderer.state(), DriverState::Idle);
        renderer.tick(&mut backend).unwrap();
        assert_eq!(renderer.state(), DriverState::Rendering);
    }

    #[test]
    fn skipped_frame_does_not_advance() {
        let mut backend = RecordingBackend::new();
        let mut renderer = Renderer::new(&mut backend, Stage::RotatingCube, CANVAS).unwrap();
        renderer.tick(&mut backend).unwrap();
        let before = *renderer.rotation();

        backend.skip_frames(1);
        assert_eq!(renderer.tick(&mut backend).unwrap(), FrameStatus::Skipped);
        assert_eq!(*renderer.rotation(), before);
        assert_eq!(renderer.frames(), 1);
        assert_eq!(
            backend.transforms(ProgramId(0)).unwrap().model,
            renderer.transforms().model
        );

        renderer.tick(&mut backend).unwrap();
        assert_eq!(renderer.frames(), 2);
        assert!(renderer.rotation().angle() > before.angle());
        assert_eq!(
            backend.transforms(ProgramId(0)).unwrap().model,
            renderer.transforms().model
        );
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let mut backend = RecordingBackend::new();
        assert!(Renderer::new(&mut backend, Stage::Cube, CanvasSize::new(0, 600)).is_err());
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn angle_after_n_frames_is_n_steps() {
        let (_, renderer) = run(Stage::RotatingCube, 10);
        let expected = (ROTATION_STEP * 10.0).rem_euclid(TAU);
        assert!((renderer.rotation().angle() - expected).abs() < 1e-5);
        assert!((renderer.rotation().angle_x() - expected / X_ROTATION_DIVISOR).abs() < 1e-5);
    }

    #[test]
    fn projection_is_constant_across_frames() {
        let (backend, _) = run(Stage::RotatingCube, 10);
        let expected = perspective(CANVAS);

        let uploaded: Vec<Transforms> = backend
            .frames()
            .iter()
            .flat_map(|f| f.items())
            .filter_map(|cmd| match cmd {
                FrameCmd::SetTransforms { transforms, .. } => Some(*transforms),
                _ => None,
            })
            .collect();

        assert_eq!(uploaded.len(), 10);
        for t in &uploaded {
            assert_eq!(t.projection, expected);
            assert_eq!(t.view, Mat4::IDENTITY);
        }
        assert_ne!(uploaded[0].model, uploaded[1].model);
    }

    #[test]
    fn uploaded_model_matches_rotation() {
        let (backend, renderer) = run(Stage::RotatingCube, 3);
        assert_eq!(
            backend.transforms(ProgramId(0)).unwrap().model,
            renderer.rotation().model_matrix()
        );
    }

    #[test]
    fn static_stages_keep_identity_model() {
        let (_, renderer) = run(Stage::Cube, 4);
        assert_eq!(renderer.transforms().model, Mat4::IDENTITY);
        assert_eq!(renderer.rotation().angle(), 0.0);
    }
}
