//! Rich-text document model
//!
//! The CMS stores rich-text bodies as a JSON tree: a `root` node whose
//! children are typed block nodes, text leaves with formatting marks, and
//! template nodes (`mdxJsxFlowElement`) carrying a template `name` and its
//! `props`. Template nodes named `iframe` are embeds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::embed::{EmbedDefaults, EmbedError, EmbedRequest};

/// Name of the embed template in the CMS schema
pub const EMBED_TEMPLATE: &str = "iframe";

/// A rich-text document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextDocument {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub children: Vec<RichTextNode>,
}

/// One node of a rich-text tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RichTextNode>,

    // Text leaves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,

    // Links and images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    // Code blocks and raw HTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    // Templates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
}

/// Classification of a node's `type` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Paragraph,
    Heading(u8),
    Blockquote,
    BulletedList,
    NumberedList,
    ListItem,
    ListItemContent,
    Link,
    Image,
    CodeBlock,
    ThematicBreak,
    LineBreak,
    Html,
    HtmlInline,
    Text,
    Template,
    Unknown,
}

impl NodeKind {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "p" => NodeKind::Paragraph,
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "h5" => NodeKind::Heading(5),
            "h6" => NodeKind::Heading(6),
            "blockquote" => NodeKind::Blockquote,
            "ul" => NodeKind::BulletedList,
            "ol" => NodeKind::NumberedList,
            "li" => NodeKind::ListItem,
            "lic" => NodeKind::ListItemContent,
            "a" => NodeKind::Link,
            "img" => NodeKind::Image,
            "code_block" => NodeKind::CodeBlock,
            "hr" => NodeKind::ThematicBreak,
            "break" => NodeKind::LineBreak,
            "html" => NodeKind::Html,
            "html_inline" => NodeKind::HtmlInline,
            "text" => NodeKind::Text,
            "mdxJsxFlowElement" | "mdxJsxTextElement" => NodeKind::Template,
            _ => NodeKind::Unknown,
        }
    }
}

impl RichTextNode {
    pub fn node_kind(&self) -> NodeKind {
        NodeKind::from_type(&self.kind)
    }

    /// Whether this node is an embed template
    pub fn is_embed(&self) -> bool {
        self.node_kind() == NodeKind::Template && self.name.as_deref() == Some(EMBED_TEMPLATE)
    }

    /// Build an embed request from the template props
    pub fn embed_request(&self, defaults: &EmbedDefaults) -> Result<EmbedRequest, EmbedError> {
        let src = self
            .props
            .get("src")
            .and_then(Value::as_str)
            .ok_or(EmbedError::MissingSrc)?;
        let title = self.props.get("title").and_then(Value::as_str);
        EmbedRequest::new(
            src,
            title,
            dimension_prop(&self.props, "width"),
            dimension_prop(&self.props, "height"),
            defaults,
        )
    }
}

/// Numeric props arrive as JSON numbers, but hand-written content may use strings
fn dimension_prop(props: &Map<String, Value>, key: &str) -> Option<u32> {
    match props.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().trim_end_matches("px").trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "type": "root",
        "children": [
            {"type": "h2", "children": [{"type": "text", "text": "Hello"}]},
            {"type": "p", "children": [{"type": "text", "text": "Bold", "bold": true}]},
            {
                "type": "mdxJsxFlowElement",
                "name": "iframe",
                "props": {"src": "https://www.youtube.com/embed/x", "width": 400.0, "height": "300"},
                "children": [{"type": "text", "text": ""}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc: RichTextDocument = serde_json::from_str(DOC).unwrap();
        assert_eq!(doc.children.len(), 3);
        assert_eq!(doc.children[0].node_kind(), NodeKind::Heading(2));
        assert_eq!(doc.children[0].children[0].text.as_deref(), Some("Hello"));
        assert!(doc.children[1].children[0].bold);
    }

    #[test]
    fn test_embed_request_from_props() {
        let doc: RichTextDocument = serde_json::from_str(DOC).unwrap();
        let node = &doc.children[2];
        assert!(node.is_embed());

        let req = node.embed_request(&EmbedDefaults::default()).unwrap();
        assert_eq!(req.src, "https://www.youtube.com/embed/x");
        assert_eq!(req.width, 400);
        assert_eq!(req.height, 300);
        assert_eq!(req.title, "Embedded content");
    }

    #[test]
    fn test_embed_without_src() {
        let node = RichTextNode {
            kind: "mdxJsxFlowElement".to_string(),
            name: Some("iframe".to_string()),
            ..Default::default()
        };
        assert!(node.is_embed());
        assert_eq!(
            node.embed_request(&EmbedDefaults::default()).unwrap_err(),
            EmbedError::MissingSrc
        );
    }

    #[test]
    fn test_other_templates_are_not_embeds() {
        let node = RichTextNode {
            kind: "mdxJsxFlowElement".to_string(),
            name: Some("callout".to_string()),
            ..Default::default()
        };
        assert!(!node.is_embed());
    }
}
