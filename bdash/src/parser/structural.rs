use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser as CmarkParser, Tag};

use crate::attrs::{self, AttributeSet};
use crate::parser::error::ParseError;
use crate::segment::Segment;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split Markdown source text into an ordered list of segments.
///
/// Only top-level fenced code blocks are candidates for promotion to
/// `Segment::App`; fences nested in lists or blockquotes stay inside the
/// surrounding prose slice. Everything that is not a tagged block is
/// preserved verbatim as prose, with segment boundaries falling exactly
/// at fence start/end.
pub fn parse_segments(source: &str, file_id: usize) -> Result<Vec<Segment>, Vec<ParseError>> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);
    let events: Vec<(Event<'_>, Range<usize>)> = parser.into_offset_iter().collect();

    let mut errors = Vec::new();
    let mut tagged: Vec<(Range<usize>, String, AttributeSet)> = Vec::new();

    // Depth of nested containers. A code block is top-level when its
    // Start event arrives at depth zero.
    let mut depth = 0usize;
    for (ev, range) in &events {
        match ev {
            Event::Start(Tag::CodeBlock(kind)) => {
                if depth == 0
                    && let CodeBlockKind::Fenced(info) = kind
                {
                    match classify_fence(source, info, range, file_id) {
                        Ok(Some((reference, attrs))) => {
                            tagged.push((range.clone(), reference, attrs));
                        }
                        Ok(None) => {}
                        Err(error) => errors.push(error),
                    }
                }
                depth += 1;
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Cut the source at tagged block boundaries; everything between is
    // verbatim prose. Empty prose slices are dropped.
    let mut segments = Vec::new();
    let mut cursor = 0usize;
    for (range, reference, attrs) in tagged {
        push_prose(&mut segments, source, cursor..range.start);
        cursor = range.end;
        segments.push(Segment::App {
            reference,
            attrs,
            span: range,
        });
    }
    push_prose(&mut segments, source, cursor..source.len());

    Ok(segments)
}

// ---------------------------------------------------------------------------
// Fence classification
// ---------------------------------------------------------------------------

/// Decide what a top-level fenced block is.
///
/// Returns `Ok(Some(..))` for a tagged application reference,
/// `Ok(None)` for anything that should remain prose (plain fences,
/// unrelated brace conventions, `.dash` blocks without an `app` key),
/// and `Err` for malformed `.dash` blocks.
fn classify_fence(
    source: &str,
    info: &str,
    range: &Range<usize>,
    file_id: usize,
) -> Result<Option<(String, AttributeSet)>, ParseError> {
    let info = info.trim();
    if !info.starts_with('{') {
        return Ok(None);
    }

    // Errors in brace-wrapped info-strings are fatal only when the block
    // carries the `.dash` marker; other brace conventions (e.g. Rmd
    // chunks) fall back to prose untouched.
    let marked = info
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split_whitespace()
        .any(|token| token == ".dash");

    let head = opening_line_span(source, range);

    let Some(interior) = info.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
        if marked {
            return Err(ParseError::error(
                "fence attribute block is missing its closing '}'",
                head,
                file_id,
            ));
        }
        return Ok(None);
    };

    let attrs = match attrs::parse_attributes(interior, head.clone(), file_id) {
        Ok(attrs) => attrs,
        Err(error) => {
            if marked {
                return Err(error);
            }
            return Ok(None);
        }
    };

    if !attrs.has_class("dash") {
        return Ok(None);
    }

    // Missing `app` key: demote to prose (documented fallback, supports
    // incremental authoring).
    let Some(reference) = attrs.get("app") else {
        return Ok(None);
    };
    let reference = reference.to_string();

    if !fence_terminated(&source[range.clone()]) {
        return Err(ParseError::error("unterminated fence", head, file_id)
            .with_note("the tagged block is never closed with a matching fence"));
    }

    Ok(Some((reference, attrs)))
}

/// Check that a fenced block's source slice closes with a matching fence.
/// pulldown-cmark auto-closes unterminated fences at end of input; a
/// tagged block that relies on that is an authoring error.
fn fence_terminated(raw: &str) -> bool {
    let raw = raw.trim_start_matches(' ');
    let Some(fence_char) = raw.chars().next() else {
        return false;
    };
    if fence_char != '`' && fence_char != '~' {
        return true;
    }
    let open_len = raw.chars().take_while(|c| *c == fence_char).count();

    let trimmed = raw.trim_end();
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        // The opening fence cannot also close the block.
        return false;
    }

    let closer = lines[lines.len() - 1].trim();
    !closer.is_empty() && closer.chars().all(|c| c == fence_char) && closer.len() >= open_len
}

/// Span of the fence's opening line, for error reporting.
fn opening_line_span(source: &str, range: &Range<usize>) -> Range<usize> {
    let end = source[range.start..]
        .find('\n')
        .map(|pos| range.start + pos)
        .unwrap_or(source.len());
    range.start..end
}

fn push_prose(segments: &mut Vec<Segment>, source: &str, span: Range<usize>) {
    let text = &source[span.clone()];
    if text.trim().is_empty() {
        return;
    }
    segments.push(Segment::Prose {
        text: text.to_string(),
        span,
    });
}
