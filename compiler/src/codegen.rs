use std::collections::BTreeSet;

use crate::Options;
use crate::assembler::CompiledDocument;
use crate::component::PropValue;

/// Dash submodules imported via `from dash import ...`; anything else
/// referenced by a component tree gets its own plain import line.
const DASH_MODULES: &[&str] = &["dcc", "html"];

/// Serialize the assembled layout into the output program source.
///
/// Identical input must always produce byte-identical output: imports
/// are sorted, component props render in a fixed order, and nothing
/// depends on hash iteration.
pub fn generate(compiled: &CompiledDocument, options: &Options) -> String {
    let mut modules = BTreeSet::new();
    compiled.layout.collect_modules(&mut modules);

    let mut out = String::new();

    // Framework import line: Dash plus every dash submodule in use.
    let mut dash_imports: Vec<&str> = vec!["Dash"];
    let mut externals: Vec<&str> = Vec::new();
    for module in &modules {
        if DASH_MODULES.contains(&module.as_str()) {
            dash_imports.push(module);
        } else {
            externals.push(module);
        }
    }
    dash_imports.sort_unstable();
    out.push_str(&format!("from dash import {}\n", dash_imports.join(", ")));
    for module in externals {
        out.push_str(&format!("import {}\n", module));
    }
    out.push('\n');

    if let Some(precode) = &options.precode {
        out.push_str(precode.trim_end());
        out.push_str("\n\n");
    }

    out.push_str("app = Dash(__name__)\n\n");

    // Layout assignment: the container's children one per line, nested
    // components rendered inline.
    let indent = &options.indent;
    match &compiled.layout.children {
        Some(PropValue::List(children)) => {
            out.push_str("app.layout = html.Div(\n");
            out.push_str(&format!("{}[\n", indent));
            for child in children {
                out.push_str(&format!("{}{}{},\n", indent, indent, child));
            }
            out.push_str(&format!("{}]\n", indent));
            out.push_str(")\n");
        }
        _ => {
            out.push_str(&format!("app.layout = {}\n", compiled.layout));
        }
    }

    out.push('\n');
    out.push_str("if __name__ == \"__main__\":\n");
    out.push_str(&format!("{}app.run(debug=True)\n", indent));

    out
}
