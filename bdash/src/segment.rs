use std::ops::Range;

use crate::attrs::AttributeSet;

/// One ordered unit of document content.
/// Segments are created by the parser and never reordered.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A verbatim slice of the source text, including any fenced blocks
    /// that did not match the tag convention.
    Prose { text: String, span: Range<usize> },

    /// A fenced block tagged `{.dash app=...}` referencing an external
    /// application module. The fence body is ignored.
    App {
        /// The `app=` value: a module path relative to the application root.
        reference: String,
        attrs: AttributeSet,
        span: Range<usize>,
    },
}

impl Segment {
    /// Byte span in source, for error reporting.
    pub fn span(&self) -> &Range<usize> {
        match self {
            Segment::Prose { span, .. } => span,
            Segment::App { span, .. } => span,
        }
    }
}
