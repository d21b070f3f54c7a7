//! Mixed content splitter
//!
//! Partitions a markdown document into markdown segments and raw iframe HTML
//! blocks. The scanner works line by line with two states:
//!
//! - `InText`: lines accumulate as markdown until a line contains `<iframe`.
//! - `InEmbedBlock`: lines accumulate as raw HTML until a line contains
//!   `</iframe>`; the opening line may close its own block.
//!
//! A block still open at end of input is emitted as raw HTML through the end
//! of the document and reported in [`SplitResult::unterminated`].

use serde::Serialize;

const IFRAME_OPEN: &[u8] = b"<iframe";
const IFRAME_CLOSE: &[u8] = b"</iframe>";

/// One contiguous unit of a post body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSegment {
    Markdown { text: String },
    RawEmbed { html: String },
}

impl ContentSegment {
    pub fn markdown(text: impl Into<String>) -> Self {
        ContentSegment::Markdown { text: text.into() }
    }

    pub fn raw_embed(html: impl Into<String>) -> Self {
        ContentSegment::RawEmbed { html: html.into() }
    }
}

/// Ordered segments of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitResult {
    pub segments: Vec<ContentSegment>,
    /// 1-based line where an iframe block was opened but never closed
    pub unterminated: Option<usize>,
}

enum State {
    InText,
    InEmbedBlock { start_line: usize },
}

/// Split a markdown document into markdown and raw iframe segments
pub fn split(document: &str) -> SplitResult {
    let mut result = SplitResult::default();
    if document.is_empty() {
        return result;
    }

    let mut state = State::InText;
    let mut pending: Vec<&str> = Vec::new();

    for (index, line) in document.split('\n').enumerate() {
        state = match state {
            State::InText if contains_ignore_ascii_case(line, IFRAME_OPEN) => {
                flush_markdown(&mut pending, &mut result.segments);
                pending.push(line);
                if contains_ignore_ascii_case(line, IFRAME_CLOSE) {
                    flush_embed(&mut pending, &mut result.segments);
                    State::InText
                } else {
                    State::InEmbedBlock {
                        start_line: index + 1,
                    }
                }
            }
            State::InText => {
                pending.push(line);
                State::InText
            }
            State::InEmbedBlock { start_line } => {
                pending.push(line);
                if contains_ignore_ascii_case(line, IFRAME_CLOSE) {
                    flush_embed(&mut pending, &mut result.segments);
                    State::InText
                } else {
                    State::InEmbedBlock { start_line }
                }
            }
        };
    }

    match state {
        State::InText => flush_markdown(&mut pending, &mut result.segments),
        State::InEmbedBlock { start_line } => {
            tracing::warn!(
                "Unterminated <iframe> block starting at line {}, rendering it as raw HTML",
                start_line
            );
            flush_embed(&mut pending, &mut result.segments);
            result.unterminated = Some(start_line);
        }
    }

    result
}

fn flush_markdown(pending: &mut Vec<&str>, segments: &mut Vec<ContentSegment>) {
    let text = pending.join("\n");
    pending.clear();
    if !text.is_empty() {
        segments.push(ContentSegment::markdown(text));
    }
}

fn flush_embed(pending: &mut Vec<&str>, segments: &mut Vec<ContentSegment>) {
    let html = pending.join("\n");
    pending.clear();
    segments.push(ContentSegment::raw_embed(html));
}

fn contains_ignore_ascii_case(haystack: &str, needle: &[u8]) -> bool {
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
