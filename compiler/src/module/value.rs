use std::collections::HashMap;

use crate::component::Component;

/// A value bound by evaluating a module statement.
#[derive(Debug, Clone)]
pub enum ModuleValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<ModuleValue>),
    Component(Component),
    /// An application instance created by `Dash(...)`. Its layout is
    /// attached by a later `<name>.layout = ...` statement.
    AppInstance { layout: Option<Component> },
}

impl ModuleValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ModuleValue::Str(_) => "string",
            ModuleValue::Int(_) => "integer",
            ModuleValue::Float(_) => "float",
            ModuleValue::Bool(_) => "boolean",
            ModuleValue::None => "None",
            ModuleValue::List(_) => "list",
            ModuleValue::Component(_) => "component",
            ModuleValue::AppInstance { .. } => "application instance",
        }
    }
}

/// One module's top-level bindings. A fresh namespace is created per
/// resolution; nothing leaks between loads.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: HashMap<String, ModuleValue>,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace {
            bindings: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModuleValue> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: &str, value: ModuleValue) {
        self.bindings.insert(name.to_string(), value);
    }

    /// Attach a layout to the application instance bound to `name`.
    /// Returns false when `name` is not bound to an application instance.
    pub fn set_app_layout(&mut self, name: &str, layout: Component) -> bool {
        match self.bindings.get_mut(name) {
            Some(ModuleValue::AppInstance { layout: slot }) => {
                *slot = Some(layout);
                true
            }
            _ => false,
        }
    }
}
