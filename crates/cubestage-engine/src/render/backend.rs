use anyhow::{bail, ensure, Result};

use crate::frame::{DrawCall, FrameList};
use crate::geometry::VertexData;
use crate::shader::{Attribute, Program};

use super::{AttributeBinding, BufferId, ProgramId};

/// Outcome of submitting one frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Drawn and presented.
    Presented,
    /// Nothing was drawn; the surface was not available this frame.
    Skipped,
}

/// The GPU-facing half of the renderer.
///
/// Setup calls (`create_program`, `upload`, `bind_attribute`) happen once;
/// `submit` replays a recorded frame. Implementations validate their inputs
/// and fail instead of drawing with incomplete state.
pub trait RenderBackend {
    /// Creates GPU objects for a linked program.
    fn create_program(&mut self, program: &Program) -> Result<ProgramId>;

    /// Uploads immutable vertex data.
    fn upload(&mut self, label: &str, data: &VertexData) -> Result<BufferId>;

    /// Attaches a buffer to one of the program's input locations.
    ///
    /// Rebinding a location replaces the previous buffer.
    fn bind_attribute(&mut self, program: ProgramId, binding: AttributeBinding) -> Result<()>;

    /// Executes one frame's commands.
    fn submit(&mut self, frame: &FrameList) -> Result<FrameStatus>;
}

/// Checks a binding against the program's declared inputs.
pub(crate) fn check_binding(
    label: &str,
    inputs: &[Attribute],
    binding: &AttributeBinding,
    buffer_components: u8,
) -> Result<()> {
    let Some(input) = inputs.iter().find(|a| a.location == binding.location) else {
        bail!("program `{label}` has no input at location {}", binding.location);
    };
    ensure!(
        binding.layout.vertex_format().is_some(),
        "unsupported attribute layout {:?}",
        binding.layout
    );
    ensure!(
        binding.layout.components == input.components,
        "input `{}` of program `{label}` takes {} components, binding declares {}",
        input.name,
        input.components,
        binding.layout.components
    );
    ensure!(
        binding.layout.components == buffer_components,
        "{} holds {buffer_components}-component vertices, binding declares {}",
        binding.buffer,
        binding.layout.components
    );
    Ok(())
}

/// Replaces or inserts `binding`, keeping the list sorted by location.
pub(crate) fn insert_binding(bindings: &mut Vec<AttributeBinding>, binding: AttributeBinding) {
    match bindings.binary_search_by_key(&binding.location, |b| b.location) {
        Ok(i) => bindings[i] = binding,
        Err(i) => bindings.insert(i, binding),
    }
}

/// Checks that every input is bound and every bound buffer covers the draw.
pub(crate) fn check_draw(
    label: &str,
    inputs: &[Attribute],
    bindings: &[AttributeBinding],
    buffer_vertices: impl Fn(BufferId) -> Option<u32>,
    call: &DrawCall,
) -> Result<()> {
    for input in inputs {
        ensure!(
            bindings.iter().any(|b| b.location == input.location),
            "input `{}` of program `{label}` is not bound",
            input.name
        );
    }

    let end = call.vertices().end;
    for binding in bindings {
        let Some(available) = buffer_vertices(binding.buffer) else {
            bail!("{} is not a known buffer", binding.buffer);
        };
        ensure!(
            end <= available,
            "draw of vertices {:?} overruns {} ({available} vertices)",
            call.vertices(),
            binding.buffer
        );
    }
    Ok(())
}
