use super::ShaderStage;

/// Shader loading failure.
///
/// Neither kind is recoverable: a program that failed to compile or link is
/// never handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    /// One stage failed to parse, validate, or declare its entry point.
    #[error("failed to compile {stage} shader `{label}`:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        label: String,
        diagnostic: String,
    },

    /// Both stages compiled but do not form a program.
    #[error("failed to link program `{label}`: {diagnostic}")]
    Link { label: String, diagnostic: String },
}

impl ShaderError {
    /// Compiler or linker message without the surrounding context.
    pub fn diagnostic(&self) -> &str {
        match self {
            ShaderError::Compile { diagnostic, .. } | ShaderError::Link { diagnostic, .. } => {
                diagnostic
            }
        }
    }

    pub fn is_compile(&self) -> bool {
        matches!(self, ShaderError::Compile { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ShaderError::Link { .. })
    }
}
