use anyhow::{ensure, Context, Result};

use crate::geometry::VertexData;
use crate::shader::Program;

use super::{AttributeBinding, AttributeLayout, BufferId, ProgramId, RenderBackend};

/// Binds `buffer` to the program input called `name`.
///
/// The data is declared as tightly packed 32-bit floats with zero offset.
/// Returns the resolved location.
pub fn bind_attribute<B: RenderBackend + ?Sized>(
    backend: &mut B,
    program_id: ProgramId,
    program: &Program,
    name: &str,
    buffer: BufferId,
    data: &VertexData,
) -> Result<u32> {
    let attribute = program
        .attribute(name)
        .with_context(|| format!("program `{}` has no attribute `{name}`", program.label()))?;

    ensure!(
        attribute.components == data.components(),
        "attribute `{name}` of program `{}` takes {} components, data has {}",
        program.label(),
        attribute.components,
        data.components()
    );

    backend.bind_attribute(
        program_id,
        AttributeBinding {
            location: attribute.location,
            buffer,
            layout: AttributeLayout::tightly_packed(data.components()),
        },
    )?;

    log::debug!(
        "bound {buffer} to `{name}` (location {}) of `{}`",
        attribute.location,
        program.label()
    );
    Ok(attribute.location)
}
