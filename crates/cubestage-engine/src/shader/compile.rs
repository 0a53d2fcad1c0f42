use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderError, ShaderSource, ShaderStage};

/// One successfully compiled stage.
///
/// Holds the source text (handed to the GPU driver later) next to the
/// validated `naga` module used for linking and reflection.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    label: String,
    stage: ShaderStage,
    text: String,
    module: naga::Module,
    entry_point: usize,
}

impl CompiledStage {
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    /// Name of the stage's entry point function.
    #[inline]
    pub fn entry_point_name(&self) -> &str {
        &self.entry_point().name
    }

    #[inline]
    pub(crate) fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_point]
    }
}

/// Compiles one stage: parse, validate, and locate its single entry point.
///
/// Any failure is a [`ShaderError::Compile`] carrying the diagnostic.
pub fn compile(source: &ShaderSource) -> Result<CompiledStage, ShaderError> {
    let fail = |diagnostic: String| ShaderError::Compile {
        stage: source.stage,
        label: source.label.to_string(),
        diagnostic,
    };

    let module = naga::front::wgsl::parse_str(&source.text)
        .map_err(|err| fail(err.emit_to_string(&source.text)))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|err| fail(error_chain(err.as_inner())))?;

    let wanted = source.stage.to_naga();
    let mut candidates = module
        .entry_points
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.stage == wanted);

    let Some((entry_point, _)) = candidates.next() else {
        return Err(fail(format!("no @{} entry point", source.stage)));
    };
    if candidates.next().is_some() {
        return Err(fail(format!("more than one @{} entry point", source.stage)));
    }

    log::debug!(
        "compiled {} shader `{}` (entry `{}`)",
        source.stage,
        source.label,
        module.entry_points[entry_point].name
    );

    Ok(CompiledStage {
        label: source.label.to_string(),
        stage: source.stage,
        text: source.text.to_string(),
        module,
        entry_point,
    })
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
