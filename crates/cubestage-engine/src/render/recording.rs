use anyhow::{bail, ensure, Context, Result};

use crate::frame::{DrawCall, FrameCmd, FrameList};
use crate::geometry::VertexData;
use crate::shader::{Attribute, Program, UniformBlock};
use crate::transform::Transforms;

use super::backend::{check_binding, check_draw, insert_binding};
use super::id::next_id;
use super::{AttributeBinding, BufferId, FrameStatus, ProgramId, RenderBackend};

#[derive(Debug)]
struct RecordedProgram {
    label: String,
    inputs: Vec<Attribute>,
    uniforms: Option<UniformBlock>,
    bindings: Vec<AttributeBinding>,
    transforms: Option<Transforms>,
}

#[derive(Debug)]
struct RecordedBuffer {
    label: String,
    components: u8,
    vertex_count: u32,
}

/// Headless backend: validates and records everything it is given.
///
/// Applies the same checks as the GPU backend, so a renderer that runs
/// against it without errors issues well-formed GPU work.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    programs: Vec<RecordedProgram>,
    buffers: Vec<RecordedBuffer>,
    frames: Vec<FrameList>,
    pending_skips: u32,
    skipped: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` submissions report [`FrameStatus::Skipped`].
    pub fn skip_frames(&mut self, n: u32) {
        self.pending_skips += n;
    }

    /// Presented frames in submission order.
    pub fn frames(&self) -> &[FrameList] {
        &self.frames
    }

    pub fn skipped_frames(&self) -> u32 {
        self.skipped
    }

    /// Every draw of every presented frame.
    pub fn draw_calls(&self) -> impl Iterator<Item = &DrawCall> {
        self.frames.iter().flat_map(|f| f.draw_calls())
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn program_label(&self, id: ProgramId) -> Option<&str> {
        self.programs.get(id.index()).map(|p| p.label.as_str())
    }

    /// Current bindings of a program, sorted by location.
    pub fn bindings(&self, id: ProgramId) -> &[AttributeBinding] {
        self.programs
            .get(id.index())
            .map(|p| p.bindings.as_slice())
            .unwrap_or_default()
    }

    /// Last matrices written to a program.
    pub fn transforms(&self, id: ProgramId) -> Option<&Transforms> {
        self.programs.get(id.index()).and_then(|p| p.transforms.as_ref())
    }

    pub fn buffer_label(&self, id: BufferId) -> Option<&str> {
        self.buffers.get(id.index()).map(|b| b.label.as_str())
    }

    pub fn buffer_vertex_count(&self, id: BufferId) -> Option<u32> {
        self.buffers.get(id.index()).map(|b| b.vertex_count)
    }

    fn program(&self, id: ProgramId) -> Result<&RecordedProgram> {
        self.programs
            .get(id.index())
            .with_context(|| format!("{id} does not exist"))
    }

    fn program_mut(&mut self, id: ProgramId) -> Result<&mut RecordedProgram> {
        self.programs
            .get_mut(id.index())
            .with_context(|| format!("{id} does not exist"))
    }
}

impl RenderBackend for RecordingBackend {
    fn create_program(&mut self, program: &Program) -> Result<ProgramId> {
        let id = ProgramId(next_id(self.programs.len())?);
        self.programs.push(RecordedProgram {
            label: program.label().to_string(),
            inputs: program.attributes().to_vec(),
            uniforms: program.uniforms().cloned(),
            bindings: Vec::new(),
            transforms: None,
        });
        Ok(id)
    }

    fn upload(&mut self, label: &str, data: &VertexData) -> Result<BufferId> {
        let id = BufferId(next_id(self.buffers.len())?);
        self.buffers.push(RecordedBuffer {
            label: label.to_string(),
            components: data.components(),
            vertex_count: data.vertex_count(),
        });
        Ok(id)
    }

    fn bind_attribute(&mut self, program: ProgramId, binding: AttributeBinding) -> Result<()> {
        let components = self
            .buffers
            .get(binding.buffer.index())
            .map(|b| b.components)
            .with_context(|| format!("{} does not exist", binding.buffer))?;

        let p = self.program_mut(program)?;
        check_binding(&p.label, &p.inputs, &binding, components)?;
        insert_binding(&mut p.bindings, binding);
        Ok(())
    }

    fn submit(&mut self, frame: &FrameList) -> Result<FrameStatus> {
        ensure!(
            matches!(frame.items().first(), Some(FrameCmd::Clear { .. })),
            "frame must start with a clear"
        );

        // Matrices are staged and only stored once the frame is presented.
        let mut staged: Vec<(ProgramId, Transforms)> = Vec::new();
        for cmd in frame.items() {
            match cmd {
                FrameCmd::Clear { color, depth } => {
                    ensure!(color.is_finite(), "clear color is not finite");
                    if let Some(d) = depth {
                        ensure!((0.0..=1.0).contains(d), "clear depth {d} is outside [0, 1]");
                    }
                }
                FrameCmd::EnableDepthTest => {}
                FrameCmd::SetTransforms { program, transforms } => {
                    let p = self.program(*program)?;
                    let Some(block) = &p.uniforms else {
                        bail!("program `{}` has no uniform block", p.label);
                    };
                    for (name, _) in transforms.named() {
                        ensure!(
                            block.member(name).is_some(),
                            "program `{}` has no uniform `{name}`",
                            p.label
                        );
                    }
                    staged.push((*program, *transforms));
                }
                FrameCmd::Draw(call) => {
                    let p = self.program(call.program)?;
                    check_draw(
                        &p.label,
                        &p.inputs,
                        &p.bindings,
                        |id| self.buffers.get(id.index()).map(|b| b.vertex_count),
                        call,
                    )?;
                    let uniforms_set = p.transforms.is_some()
                        || staged.iter().any(|(id, _)| *id == call.program);
                    ensure!(
                        p.uniforms.is_none() || uniforms_set,
                        "program `{}` drawn before its uniforms were set",
                        p.label
                    );
                }
            }
        }

        if self.pending_skips > 0 {
            self.pending_skips -= 1;
            self.skipped += 1;
            return Ok(FrameStatus::Skipped);
        }

        for (id, transforms) in staged {
            self.program_mut(id)?.transforms = Some(transforms);
        }
        self.frames.push(frame.clone());
        Ok(FrameStatus::Presented)
    }
}
