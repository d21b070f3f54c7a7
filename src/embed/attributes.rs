//! Iframe attribute extraction
//!
//! Reads `<iframe ...>` start tags of a raw embed block, not arbitrary HTML.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{EmbedDefaults, EmbedError};

lazy_static! {
    static ref IFRAME_TAG_RE: Regex =
        Regex::new(r#"(?is)<iframe\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap();
    static ref ATTRIBUTE_RE: Regex = Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
    )
    .unwrap();
    static ref IFRAME_CLOSE_RE: Regex = Regex::new(r"(?i)</iframe\s*>").unwrap();
}

/// The attributes of one iframe, with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedRequest {
    pub src: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl EmbedRequest {
    /// Build a request, filling omitted attributes from `defaults`
    ///
    /// An empty `src` is an error; an empty title counts as omitted.
    pub fn new(
        src: &str,
        title: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
        defaults: &EmbedDefaults,
    ) -> Result<Self, EmbedError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(EmbedError::MissingSrc);
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&defaults.title);

        Ok(Self {
            src: src.to_string(),
            title: title.to_string(),
            width: width.unwrap_or(defaults.width),
            height: height.unwrap_or(defaults.height),
        })
    }
}

/// Extract iframe attributes using the built-in defaults
pub fn extract_embed_attributes(raw_html: &str) -> Result<EmbedRequest, EmbedError> {
    extract_embed_attributes_with(raw_html, &EmbedDefaults::default())
}

/// Extract the attributes of the first iframe in a raw embed block
pub fn extract_embed_attributes_with(
    raw_html: &str,
    defaults: &EmbedDefaults,
) -> Result<EmbedRequest, EmbedError> {
    let attributes = IFRAME_TAG_RE
        .captures(raw_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(EmbedError::MissingSrc)?;
    request_from_attributes(attributes, defaults)
}

/// One piece of a raw embed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedBlockPart {
    /// Text outside any iframe tag, closing tags removed
    Text(String),
    /// One iframe start tag
    Embed(Result<EmbedRequest, EmbedError>),
}

/// Break a raw embed block into its iframes and the text around them
///
/// A block without a parseable start tag yields a single missing-src embed.
pub fn embed_block_parts(raw_html: &str, defaults: &EmbedDefaults) -> Vec<EmbedBlockPart> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in IFRAME_TAG_RE.captures_iter(raw_html) {
        let Some(tag) = caps.get(0) else { continue };
        push_text(&raw_html[last..tag.start()], &mut parts);
        let attributes = caps.get(1).map_or("", |m| m.as_str());
        parts.push(EmbedBlockPart::Embed(request_from_attributes(
            attributes, defaults,
        )));
        last = tag.end();
    }

    if last == 0 {
        return vec![EmbedBlockPart::Embed(Err(EmbedError::MissingSrc))];
    }
    push_text(&raw_html[last..], &mut parts);
    parts
}

fn push_text(html: &str, parts: &mut Vec<EmbedBlockPart>) {
    let text = IFRAME_CLOSE_RE.replace_all(html, "");
    let text = text.trim();
    if !text.is_empty() {
        parts.push(EmbedBlockPart::Text(text.to_string()));
    }
}

fn request_from_attributes(
    attributes: &str,
    defaults: &EmbedDefaults,
) -> Result<EmbedRequest, EmbedError> {
    let mut src: Option<String> = None;
    let mut title: Option<String> = None;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    for caps in ATTRIBUTE_RE.captures_iter(attributes) {
        let name = caps[1].to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| decode_entities(m.as_str()));

        // The first occurrence of an attribute wins, as in HTML parsing
        match (name.as_str(), value) {
            ("src", Some(v)) if src.is_none() => src = Some(v),
            ("title", Some(v)) if title.is_none() => title = Some(v),
            ("width", Some(v)) if width.is_none() => width = parse_dimension("width", &v),
            ("height", Some(v)) if height.is_none() => height = parse_dimension("height", &v),
            _ => {}
        }
    }

    let src = src.ok_or(EmbedError::MissingSrc)?;
    EmbedRequest::new(&src, title.as_deref(), width, height, defaults)
}

/// Parse a pixel dimension, accepting an optional `px` suffix
fn parse_dimension(name: &str, value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match digits.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!("Ignoring non-pixel iframe {} {:?}", name, value);
            None
        }
    }
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_given_rest_defaulted() {
        let req = extract_embed_attributes(r#"<iframe src="https://vimeo.com/1" width="400">"#)
            .unwrap();
        assert_eq!(
            req,
            EmbedRequest {
                src: "https://vimeo.com/1".to_string(),
                title: "Embedded content".to_string(),
                width: 400,
                height: 315,
            }
        );
    }

    #[test]
    fn test_missing_src_is_error() {
        let err = extract_embed_attributes(r#"<iframe width="400" height="300"></iframe>"#)
            .unwrap_err();
        assert_eq!(err, EmbedError::MissingSrc);

        let err = extract_embed_attributes(r#"<iframe src=""></iframe>"#).unwrap_err();
        assert_eq!(err, EmbedError::MissingSrc);
    }

    #[test]
    fn test_no_iframe_tag_is_missing_src() {
        assert_eq!(
            extract_embed_attributes("just text").unwrap_err(),
            EmbedError::MissingSrc
        );
    }

    #[test]
    fn test_quote_styles_and_multiline_tag() {
        let html = "<iframe\n  SRC='https://www.youtube.com/embed/abc?si=x&amp;t=1'\n  title=\"A > B\"\n  width=640 height=\"360px\"\n  allowfullscreen>\n</iframe>";
        let req = extract_embed_attributes(html).unwrap();
        assert_eq!(req.src, "https://www.youtube.com/embed/abc?si=x&t=1");
        assert_eq!(req.title, "A > B");
        assert_eq!(req.width, 640);
        assert_eq!(req.height, 360);
    }

    #[test]
    fn test_configured_defaults() {
        let defaults = EmbedDefaults {
            width: 800,
            height: 450,
            title: "Widget".to_string(),
        };
        let req = extract_embed_attributes_with(
            r#"<iframe src="https://calendly.com/me" height="700" title=""></iframe>"#,
            &defaults,
        )
        .unwrap();
        assert_eq!(req.width, 800);
        assert_eq!(req.height, 700);
        assert_eq!(req.title, "Widget");
    }

    #[test]
    fn test_non_numeric_dimension_falls_back() {
        let req =
            extract_embed_attributes(r#"<iframe src="https://typeform.com/to/x" width="100%">"#)
                .unwrap();
        assert_eq!(req.width, 560);
    }

    #[test]
    fn test_first_attribute_occurrence_wins() {
        let req = extract_embed_attributes(
            r#"<iframe src="https://vimeo.com/1" src="https://evil.example/">"#,
        )
        .unwrap();
        assert_eq!(req.src, "https://vimeo.com/1");
    }

    #[test]
    fn test_block_parts_keep_every_iframe_and_text() {
        let parts = embed_block_parts(
            r#"Watch <iframe src="https://youtube.com/a"></iframe><iframe src="https://evil.example/b"></iframe> now"#,
            &EmbedDefaults::default(),
        );
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], EmbedBlockPart::Text("Watch".to_string()));
        assert!(matches!(&parts[1], EmbedBlockPart::Embed(Ok(r)) if r.src == "https://youtube.com/a"));
        assert!(matches!(&parts[2], EmbedBlockPart::Embed(Ok(r)) if r.src == "https://evil.example/b"));
        assert_eq!(parts[3], EmbedBlockPart::Text("now".to_string()));
    }

    #[test]
    fn test_block_without_start_tag() {
        let parts = embed_block_parts("<iframe src=\"x\"", &EmbedDefaults::default());
        assert_eq!(parts, vec![EmbedBlockPart::Embed(Err(EmbedError::MissingSrc))]);
    }
}
