use std::fmt;
use std::ops::Range;

/// Errors raised while resolving application modules and generating the
/// output program. All of these abort the whole compilation; a document
/// either compiles completely or not at all.
#[derive(Debug)]
pub enum CompileError {
    /// The `app=` reference does not exist under the application root.
    ModuleNotFound(String),
    /// The `app=` reference resolves outside the application root.
    OutsideRoot(String),
    /// The referenced module is not valid declarative module source.
    ModuleParse {
        reference: String,
        line: usize,
        message: String,
    },
    /// The module loads but exposes neither `app.layout` nor `layout`.
    MissingContract(String),
    IoError(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::ModuleNotFound(reference) => {
                write!(f, "module not found: {}", reference)
            }
            CompileError::OutsideRoot(reference) => {
                write!(
                    f,
                    "module reference escapes the application root: {}",
                    reference
                )
            }
            CompileError::ModuleParse {
                reference,
                line,
                message,
            } => {
                write!(f, "cannot load '{}': line {}: {}", reference, line, message)
            }
            CompileError::MissingContract(reference) => {
                write!(
                    f,
                    "module '{}' exposes neither an `app` with a layout nor a `layout` component",
                    reference
                )
            }
            CompileError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {}

/// A compile error enriched with the offending fence's location in the
/// source document.
#[derive(Debug)]
pub struct DiagnosticError {
    pub error: CompileError,
    pub span: Option<Range<usize>>,
    pub source_id: usize,
}

impl DiagnosticError {
    /// Attach the document span of the fence that triggered the error.
    pub fn with_span(error: CompileError, span: Range<usize>, source_id: usize) -> Self {
        DiagnosticError {
            error,
            span: Some(span),
            source_id,
        }
    }
}

impl From<CompileError> for DiagnosticError {
    fn from(error: CompileError) -> Self {
        DiagnosticError {
            error,
            span: None,
            source_id: 0,
        }
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for DiagnosticError {}
