//! Rich-text document rendering

use anyhow::Result;

use super::{BodyRenderer, RenderedBody};
use crate::content::richtext::{NodeKind, RichTextNode};
use crate::embed::{split, ContentSegment};
use crate::helpers::{element, escape_html};

impl BodyRenderer {
    /// Render rich-text nodes in order
    pub(super) fn render_rich_text(
        &self,
        nodes: &[RichTextNode],
        out: &mut RenderedBody,
    ) -> Result<()> {
        for node in nodes {
            self.render_node(node, out)?;
        }
        Ok(())
    }

    fn render_node(&self, node: &RichTextNode, out: &mut RenderedBody) -> Result<()> {
        match node.node_kind() {
            NodeKind::Text => out.html.push_str(&text_leaf(node)),
            NodeKind::Paragraph => self.wrap("p", node, out)?,
            NodeKind::Heading(level) => self.wrap(&format!("h{}", level), node, out)?,
            NodeKind::Blockquote => self.wrap("blockquote", node, out)?,
            NodeKind::BulletedList => self.wrap("ul", node, out)?,
            NodeKind::NumberedList => self.wrap("ol", node, out)?,
            NodeKind::ListItem => self.wrap("li", node, out)?,
            NodeKind::ListItemContent | NodeKind::Unknown => {
                self.render_rich_text(&node.children, out)?
            }
            NodeKind::Link => {
                let mut inner = RenderedBody::default();
                self.render_rich_text(&node.children, &mut inner)?;
                out.embeds.append(&mut inner.embeds);

                let mut attrs = vec![("href", Some(node.url.as_deref().unwrap_or("#")))];
                if let Some(title) = node.title.as_deref().filter(|t| !t.is_empty()) {
                    attrs.push(("title", Some(title)));
                }
                out.html.push_str(&element("a", &attrs, &inner.html));
            }
            NodeKind::Image => out.html.push_str(&image(node)),
            NodeKind::CodeBlock => {
                let code = node.value.as_deref().unwrap_or_default();
                let lang = node.lang.as_deref().filter(|l| !l.is_empty());
                out.html.push_str(&self.markdown.highlight_code(code, lang));
            }
            NodeKind::ThematicBreak => out.html.push_str("<hr />\n"),
            NodeKind::LineBreak => out.html.push_str("<br />"),
            NodeKind::Html | NodeKind::HtmlInline => {
                self.render_raw_html(node.value.as_deref().unwrap_or_default(), out)
            }
            NodeKind::Template if node.is_embed() => {
                let request = node.embed_request(&self.policy.defaults);
                self.render_embed(request, out);
            }
            NodeKind::Template => {
                tracing::debug!(
                    "Skipping rich-text template {:?}",
                    node.name.as_deref().unwrap_or("")
                );
            }
        }
        Ok(())
    }

    fn wrap(&self, tag: &str, node: &RichTextNode, out: &mut RenderedBody) -> Result<()> {
        out.html.push_str(&format!("<{}>", tag));
        self.render_rich_text(&node.children, out)?;
        out.html.push_str(&format!("</{}>\n", tag));
        Ok(())
    }

    /// Raw HTML nodes may hide iframes, so they are split like markdown text
    fn render_raw_html(&self, value: &str, out: &mut RenderedBody) {
        for segment in split(value).segments {
            match segment {
                ContentSegment::Markdown { text } if self.markdown.allows_raw_html() => {
                    out.html.push_str(&text)
                }
                ContentSegment::Markdown { text } => out.html.push_str(&escape_html(&text)),
                ContentSegment::RawEmbed { html } => self.render_embed_block(&html, out),
            }
        }
    }
}

/// A text leaf with its formatting marks
fn text_leaf(node: &RichTextNode) -> String {
    let mut html = escape_html(node.text.as_deref().unwrap_or_default());
    if node.code {
        html = format!("<code>{}</code>", html);
    }
    if node.bold {
        html = format!("<strong>{}</strong>", html);
    }
    if node.italic {
        html = format!("<em>{}</em>", html);
    }
    if node.underline {
        html = format!("<u>{}</u>", html);
    }
    if node.strikethrough {
        html = format!("<s>{}</s>", html);
    }
    html
}

fn image(node: &RichTextNode) -> String {
    let src = node.url.as_deref().unwrap_or_default();
    let alt = node.alt.as_deref().unwrap_or_default();
    let img = format!(
        r#"<img src="{}" alt="{}" />"#,
        escape_html(src),
        escape_html(alt)
    );
    match node.caption.as_deref().filter(|c| !c.is_empty()) {
        Some(caption) => format!(
            "<figure>{}<figcaption>{}</figcaption></figure>\n",
            img,
            escape_html(caption)
        ),
        None => img,
    }
}
