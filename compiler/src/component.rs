use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A renderable component tree node, mirroring the constructor-call form
/// the generated program hands to the UI framework.
///
/// Rendering is deterministic and round-trippable: `children` first, all
/// other props in key order, Python literal syntax throughout. Identical
/// trees always render to identical text.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Component module: `html`, `dcc`, ...
    pub module: String,
    /// Component type name: `Div`, `Markdown`, ...
    pub name: String,
    /// The `children` prop, rendered before all others when present.
    pub children: Option<PropValue>,
    /// Remaining props. A BTreeMap so iteration order is the render order.
    pub props: BTreeMap<String, PropValue>,
}

impl Component {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Component {
            module: module.into(),
            name: name.into(),
            children: None,
            props: BTreeMap::new(),
        }
    }

    /// Prefix every `id` prop in the tree, the namespacing that keeps
    /// embedded apps from colliding on component ids.
    pub fn prefix_ids(&mut self, prefix: &str) {
        if let Some(PropValue::Str(id)) = self.props.get_mut("id") {
            *id = format!("{}{}", prefix, id);
        }
        if let Some(children) = &mut self.children {
            children.prefix_ids(prefix);
        }
        for value in self.props.values_mut() {
            value.prefix_ids(prefix);
        }
    }

    /// Collect every component module referenced in the tree.
    pub fn collect_modules(&self, modules: &mut BTreeSet<String>) {
        modules.insert(self.module.clone());
        if let Some(children) = &self.children {
            children.collect_modules(modules);
        }
        for value in self.props.values() {
            value.collect_modules(modules);
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.module, self.name)?;
        let mut first = true;
        if let Some(children) = &self.children {
            write!(f, "children={}", children)?;
            first = false;
        }
        for (key, value) in &self.props {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        write!(f, ")")
    }
}

/// A component prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Rendered as a single-quoted Python string literal.
    Str(String),
    /// Rendered as a triple-quoted Python string literal (Markdown prose).
    MultilineStr(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<PropValue>),
    Component(Box<Component>),
}

impl PropValue {
    fn prefix_ids(&mut self, prefix: &str) {
        match self {
            PropValue::Component(component) => component.prefix_ids(prefix),
            PropValue::List(items) => {
                for item in items {
                    item.prefix_ids(prefix);
                }
            }
            _ => {}
        }
    }

    fn collect_modules(&self, modules: &mut BTreeSet<String>) {
        match self {
            PropValue::Component(component) => component.collect_modules(modules),
            PropValue::List(items) => {
                for item in items {
                    item.collect_modules(modules);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "'{}'", escape_single_quoted(s)),
            PropValue::MultilineStr(s) => {
                write!(f, "\"\"\"\n{}\"\"\"", escape_triple_quoted(s))
            }
            PropValue::Int(n) => write!(f, "{}", n),
            PropValue::Float(n) => write!(f, "{}", python_float(*n)),
            PropValue::Bool(true) => write!(f, "True"),
            PropValue::Bool(false) => write!(f, "False"),
            PropValue::None => write!(f, "None"),
            PropValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            PropValue::Component(component) => write!(f, "{}", component),
        }
    }
}

fn escape_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape prose for embedding in a triple-quoted literal. Interior runs
/// of three quotes and a trailing quote would terminate the literal
/// early; everything else passes through verbatim.
fn escape_triple_quoted(s: &str) -> String {
    let mut out = s.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    if out.ends_with('"') {
        out.push('\n');
    }
    out
}

/// Render a float the way Python's repr does: whole floats keep a
/// trailing `.0` so they round-trip as floats.
fn python_float(n: f64) -> String {
    if n.is_finite() && n == n.trunc() && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}
