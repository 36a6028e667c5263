pub mod assembler;
pub mod codegen;
pub mod component;
pub mod error;
pub mod module;
pub mod provider;

pub use error::{CompileError, DiagnosticError};
pub use module::EmbeddedProvider;
pub use provider::{ComponentProvider, ModuleContract, ResolvedApp};

use std::path::Path;

use bdash::Document;

/// Code generation knobs, normally populated from `bdash.toml`.
#[derive(Debug, Clone)]
pub struct Options {
    /// Indent unit used in the generated program.
    pub indent: String,
    /// className attached to every generated Markdown component.
    pub markdown_class: Option<String>,
    /// className prepended to every wrapped application component.
    pub layout_class: Option<String>,
    /// Verbatim code emitted between the imports and the app assignment.
    pub precode: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: "    ".to_string(),
            markdown_class: None,
            layout_class: None,
            precode: None,
        }
    }
}

/// Compile a parsed document against an application root.
pub fn compile(document: &Document, app_root: &Path) -> Result<String, DiagnosticError> {
    compile_with_options(document, app_root, &Options::default())
}

/// Compile with explicit code generation options.
pub fn compile_with_options(
    document: &Document,
    app_root: &Path,
    options: &Options,
) -> Result<String, DiagnosticError> {
    let provider = EmbeddedProvider::new(app_root);
    compile_with_provider(document, &provider, options)
}

/// Compile with a custom module resolution strategy.
pub fn compile_with_provider(
    document: &Document,
    provider: &dyn ComponentProvider,
    options: &Options,
) -> Result<String, DiagnosticError> {
    let compiled = assembler::assemble(document, provider, options)?;
    Ok(codegen::generate(&compiled, options))
}
