pub mod parser;
pub mod value;

use std::path::{Path, PathBuf};

use crate::component::{Component, PropValue};
use crate::error::CompileError;
use crate::provider::{ComponentProvider, ModuleContract, ResolvedApp};

use self::parser::{Expr, Statement};
use self::value::{ModuleValue, Namespace};

/// Resolves `app=` references by evaluating the referenced module with
/// the embedded declarative evaluator.
///
/// Each resolution runs in a fresh namespace and resolutions are never
/// cached: resolving the same reference twice yields two independent
/// loads, so no state can bleed between embedded apps.
pub struct EmbeddedProvider {
    root: PathBuf,
}

impl EmbeddedProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        EmbeddedProvider { root: root.into() }
    }

    /// Resolve the reference against the application root. Resolution is
    /// restricted to within the root directory.
    fn locate(&self, reference: &str) -> Result<PathBuf, CompileError> {
        let candidate = self.root.join(reference);
        if !candidate.is_file() {
            return Err(CompileError::ModuleNotFound(reference.to_string()));
        }

        let canonical = candidate
            .canonicalize()
            .map_err(|e| CompileError::IoError(format!("cannot resolve '{}': {}", reference, e)))?;
        let root = self
            .root
            .canonicalize()
            .map_err(|e| CompileError::IoError(format!("cannot resolve application root: {}", e)))?;

        if !canonical.starts_with(&root) {
            return Err(CompileError::OutsideRoot(reference.to_string()));
        }
        Ok(canonical)
    }
}

impl ComponentProvider for EmbeddedProvider {
    fn resolve(&self, reference: &str) -> Result<ResolvedApp, CompileError> {
        let path = self.locate(reference)?;
        let source = std::fs::read_to_string(&path)
            .map_err(|e| CompileError::IoError(format!("cannot read '{}': {}", reference, e)))?;

        let statements = parser::parse_module(&source).map_err(|e| CompileError::ModuleParse {
            reference: reference.to_string(),
            line: e.line,
            message: e.message,
        })?;

        let mut namespace = Namespace::new();
        for statement in &statements {
            execute_statement(statement, &mut namespace, reference)?;
        }

        let contract = probe_contract(&namespace, reference)?;
        let mut layout = contract.into_layout();

        let prefix = id_prefix(&path);
        layout.prefix_ids(&prefix);

        Ok(ResolvedApp { layout, prefix })
    }
}

/// The id namespace prefix for a module: its file stem plus `_`.
fn id_prefix(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_", stem)
}

// ---------------------------------------------------------------------------
// Statement execution
// ---------------------------------------------------------------------------

fn execute_statement(
    statement: &Statement,
    namespace: &mut Namespace,
    reference: &str,
) -> Result<(), CompileError> {
    match statement {
        Statement::Assign { name, expr, line } => {
            let value = evaluate(expr, namespace, reference, *line)?;
            namespace.set(name, value);
            Ok(())
        }
        Statement::AttrAssign {
            target,
            attr,
            expr,
            line,
        } => {
            if attr != "layout" {
                return Err(module_error(
                    reference,
                    *line,
                    format!("unsupported attribute assignment '{}.{}'", target, attr),
                ));
            }
            let component = match evaluate(expr, namespace, reference, *line)? {
                ModuleValue::Component(component) => component,
                other => {
                    return Err(module_error(
                        reference,
                        *line,
                        format!("layout must be a component, got {}", other.type_name()),
                    ));
                }
            };
            if !namespace.set_app_layout(target, component) {
                return Err(module_error(
                    reference,
                    *line,
                    format!("'{}' is not an application instance", target),
                ));
            }
            Ok(())
        }
    }
}

fn evaluate(
    expr: &Expr,
    namespace: &Namespace,
    reference: &str,
    line: usize,
) -> Result<ModuleValue, CompileError> {
    match expr {
        Expr::Str(s) => Ok(ModuleValue::Str(s.clone())),
        Expr::Int(n) => Ok(ModuleValue::Int(*n)),
        Expr::Float(n) => Ok(ModuleValue::Float(*n)),
        Expr::Bool(b) => Ok(ModuleValue::Bool(*b)),
        Expr::None => Ok(ModuleValue::None),

        Expr::Name(name) => namespace.get(name).cloned().ok_or_else(|| {
            module_error(reference, line, format!("undefined name '{}'", name))
        }),

        Expr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate(item, namespace, reference, line)?);
            }
            Ok(ModuleValue::List(values))
        }

        Expr::Call {
            module: None,
            name,
            ..
        } if name == "Dash" => Ok(ModuleValue::AppInstance { layout: None }),

        Expr::Call {
            module: None, name, ..
        } => Err(module_error(
            reference,
            line,
            format!("constructor '{}' must be module-qualified", name),
        )),

        Expr::Call {
            module: Some(module),
            name,
            args,
            kwargs,
        } => {
            let mut component = Component::new(module.clone(), name.clone());

            if args.len() > 1 {
                return Err(module_error(
                    reference,
                    line,
                    "expected at most one positional argument (children)",
                ));
            }
            if let Some(arg) = args.first() {
                let value = evaluate(arg, namespace, reference, line)?;
                component.children = Some(to_prop(value, reference, line)?);
            }

            for (key, expr) in kwargs {
                let value = evaluate(expr, namespace, reference, line)?;
                let prop = to_prop(value, reference, line)?;
                if key == "children" {
                    if component.children.is_some() {
                        return Err(module_error(
                            reference,
                            line,
                            "children given both positionally and by keyword",
                        ));
                    }
                    component.children = Some(prop);
                } else {
                    component.props.insert(key.clone(), prop);
                }
            }

            Ok(ModuleValue::Component(component))
        }
    }
}

fn to_prop(value: ModuleValue, reference: &str, line: usize) -> Result<PropValue, CompileError> {
    match value {
        ModuleValue::Str(s) => Ok(PropValue::Str(s)),
        ModuleValue::Int(n) => Ok(PropValue::Int(n)),
        ModuleValue::Float(n) => Ok(PropValue::Float(n)),
        ModuleValue::Bool(b) => Ok(PropValue::Bool(b)),
        ModuleValue::None => Ok(PropValue::None),
        ModuleValue::List(items) => {
            let mut props = Vec::with_capacity(items.len());
            for item in items {
                props.push(to_prop(item, reference, line)?);
            }
            Ok(PropValue::List(props))
        }
        ModuleValue::Component(component) => Ok(PropValue::Component(Box::new(component))),
        ModuleValue::AppInstance { .. } => Err(module_error(
            reference,
            line,
            "an application instance cannot be used as a component property",
        )),
    }
}

// ---------------------------------------------------------------------------
// Contract probing
// ---------------------------------------------------------------------------

/// Inspect the evaluated namespace for the module contract: an `app`
/// with a layout, else a bare `layout`. `app.layout` takes precedence
/// when both are present.
fn probe_contract(namespace: &Namespace, reference: &str) -> Result<ModuleContract, CompileError> {
    if let Some(ModuleValue::AppInstance {
        layout: Some(layout),
    }) = namespace.get("app")
    {
        return Ok(ModuleContract::AppInstance(layout.clone()));
    }

    match namespace.get("layout") {
        Some(ModuleValue::Component(layout)) => Ok(ModuleContract::BareLayout(layout.clone())),
        _ => Err(CompileError::MissingContract(reference.to_string())),
    }
}

fn module_error(reference: &str, line: usize, message: impl Into<String>) -> CompileError {
    CompileError::ModuleParse {
        reference: reference.to_string(),
        line,
        message: message.into(),
    }
}
