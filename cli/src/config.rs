use std::path::{Path, PathBuf};

use serde::Deserialize;

use compiler::Options;

/// Optional compiler configuration loaded from `bdash.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Application root for resolving `app=` references.
    /// The --app-path flag takes precedence.
    #[serde(default)]
    pub app_path: Option<PathBuf>,

    /// Indent unit used in the generated program.
    #[serde(default)]
    pub indent: Option<String>,

    /// className attached to every generated Markdown component.
    #[serde(default)]
    pub markdown_class: Option<String>,

    /// className prepended to every wrapped application component.
    #[serde(default)]
    pub layout_class: Option<String>,

    /// Verbatim code emitted between the imports and the app assignment.
    #[serde(default)]
    pub precode: Option<String>,
}

impl Config {
    pub fn to_options(&self) -> Options {
        let mut options = Options::default();
        if let Some(indent) = &self.indent {
            options.indent = indent.clone();
        }
        options.markdown_class = self.markdown_class.clone();
        options.layout_class = self.layout_class.clone();
        options.precode = self.precode.clone();
        options
    }
}

/// Load configuration. An explicit --config path must exist and parse;
/// otherwise a `bdash.toml` next to the document is used when present.
pub fn load(explicit: Option<&Path>, document: &str) -> Result<Config, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let sibling = Path::new(document)
                .parent()
                .map(|dir| dir.join("bdash.toml"))
                .unwrap_or_else(|| PathBuf::from("bdash.toml"));
            if !sibling.is_file() {
                return Ok(Config::default());
            }
            sibling
        }
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}
