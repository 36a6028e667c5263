use crate::component::Component;
use crate::error::CompileError;

/// The renderable contract a resolved module satisfies.
#[derive(Debug, Clone)]
pub enum ModuleContract {
    /// The module exposed an `app` whose `layout` is set.
    AppInstance(Component),
    /// The module exposed a bare `layout` component tree.
    BareLayout(Component),
}

impl ModuleContract {
    /// Extract the component tree. `AppInstance` is the more specific
    /// contract and takes precedence when a module exposes both forms.
    pub fn into_layout(self) -> Component {
        match self {
            ModuleContract::AppInstance(layout) => layout,
            ModuleContract::BareLayout(layout) => layout,
        }
    }
}

/// Outcome of one module resolution.
#[derive(Debug, Clone)]
pub struct ResolvedApp {
    /// The extracted component tree, ids already namespaced.
    pub layout: Component,
    /// The module file stem used as the id namespace prefix.
    pub prefix: String,
}

/// Loads a referenced application module and extracts its component
/// tree. This is the explicit plugin boundary of the compiler:
/// implementations must evaluate each reference in isolation, with no
/// state shared or cached between resolutions.
pub trait ComponentProvider {
    fn resolve(&self, reference: &str) -> Result<ResolvedApp, CompileError>;
}
