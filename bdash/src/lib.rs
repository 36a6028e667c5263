pub mod attrs;
pub mod parser;
pub mod segment;

use crate::segment::Segment;

/// A parsed bdash document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Ordered segments: verbatim prose and tagged application references.
    /// Segment order is the final page order.
    pub segments: Vec<Segment>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}
