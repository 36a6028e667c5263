use bdash::Document;
use bdash::attrs::AttributeSet;
use bdash::segment::Segment;

use crate::Options;
use crate::component::{Component, PropValue};
use crate::error::DiagnosticError;
use crate::provider::{ComponentProvider, ResolvedApp};

/// The assembled page: one top-level container whose children are the
/// per-segment components, in document order. Owned by the Code
/// Generator from here on.
#[derive(Debug)]
pub struct CompiledDocument {
    pub layout: Component,
}

/// Walk the ordered segment sequence and map it one-to-one onto
/// renderable components. Prose becomes a `dcc.Markdown` block; tagged
/// blocks are replaced by their resolved component trees. No
/// reordering, no merging.
pub fn assemble(
    document: &Document,
    provider: &dyn ComponentProvider,
    options: &Options,
) -> Result<CompiledDocument, DiagnosticError> {
    let mut children = Vec::with_capacity(document.segments.len());

    for segment in &document.segments {
        match segment {
            Segment::Prose { text, .. } => {
                children.push(PropValue::Component(Box::new(markdown_component(
                    text, options,
                ))));
            }
            Segment::App {
                reference,
                attrs,
                span,
            } => {
                let resolved = provider.resolve(reference).map_err(|error| {
                    DiagnosticError::with_span(error, span.clone(), document.source_id)
                })?;
                children.push(PropValue::Component(Box::new(app_component(
                    resolved, attrs, options,
                ))));
            }
        }
    }

    let mut layout = Component::new("html", "Div");
    layout.children = Some(PropValue::List(children));
    Ok(CompiledDocument { layout })
}

/// A prose segment: the generated program renders it at runtime through
/// the framework's Markdown component.
fn markdown_component(text: &str, options: &Options) -> Component {
    let mut component = Component::new("dcc", "Markdown");
    component.children = Some(PropValue::MultilineStr(text.trim().to_string()));
    if let Some(class) = &options.markdown_class {
        component
            .props
            .insert("className".to_string(), PropValue::Str(class.clone()));
    }
    component
}

/// An application segment: the resolved tree is embedded directly. A
/// wrapper div is added only when the tagged block carried an id or
/// extra classes (or a layout class is configured); otherwise the tree
/// stands alone.
fn app_component(resolved: ResolvedApp, attrs: &AttributeSet, options: &Options) -> Component {
    let mut classes: Vec<&str> = Vec::new();
    if let Some(class) = &options.layout_class {
        classes.push(class);
    }
    classes.extend(
        attrs
            .classes
            .iter()
            .filter(|c| c.as_str() != "dash")
            .map(|c| c.as_str()),
    );

    if attrs.id.is_none() && classes.is_empty() {
        return resolved.layout;
    }

    let mut wrapper = Component::new("html", "Div");
    wrapper.children = Some(PropValue::Component(Box::new(resolved.layout)));
    if !classes.is_empty() {
        wrapper.props.insert(
            "className".to_string(),
            PropValue::Str(classes.join(" ")),
        );
    }
    if let Some(id) = &attrs.id {
        wrapper
            .props
            .insert("id".to_string(), PropValue::Str(id.clone()));
    }
    wrapper
}
