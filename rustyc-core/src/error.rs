use std::path::PathBuf;

use thiserror::Error;

use crate::span::Span;

/// Conditions that end the compilation of one file.
///
/// Recoverable problems are diagnostics, not errors; see
/// [`crate::diagnostic::DiagnosticsEngine`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source {path}: {source}")]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{construct} is not supported")]
    Unsupported { construct: String, span: Span },
    #[error("compilation failed with {errors} error(s)")]
    CompilationFailed { errors: u32 },
    #[error("code generation failed: {0}")]
    Codegen(String),
    #[error("scope replay diverged from the recorded scopes: {0}")]
    ScopeMismatch(String),
}

impl CoreError {
    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        CoreError::Unsupported {
            construct: construct.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CoreError::Unsupported { span, .. } => Some(*span),
            _ => None,
        }
    }
}
