//! Post body rendering
//!
//! A body is rendered by dispatching on its shape: markdown bodies are split
//! into segments and each segment goes to the markdown renderer or the embed
//! path; rich-text bodies are walked node by node. Every embed goes through
//! the [`EmbedPolicy`] and renders as either a live iframe or a visible
//! placeholder, never both.

mod richtext;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, PostBody};
use crate::embed::{
    embed_block_parts, split, ContentSegment, EmbedBlockPart, EmbedError, EmbedPolicy,
    EmbedRequest, Verdict,
};
use crate::helpers::{element, escape_html};

/// Permissions granted to allowed iframes
const IFRAME_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

/// The decision taken for one embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedReport {
    /// The embed source, when one was present
    pub src: Option<String>,
    pub verdict: Verdict,
}

/// Rendered HTML of one body plus what happened to its embeds
#[derive(Debug, Clone, Default)]
pub struct RenderedBody {
    pub html: String,
    /// Embeds in document order
    pub embeds: Vec<EmbedReport>,
    /// Line where an unterminated iframe block began, for markdown bodies
    pub unterminated: Option<usize>,
}

impl RenderedBody {
    /// Whether any embed was blocked or invalid, or a block was left open
    pub fn has_problems(&self) -> bool {
        self.unterminated.is_some() || self.embeds.iter().any(|e| !e.verdict.is_allowed())
    }
}

/// Renders post bodies with gated embeds
pub struct BodyRenderer {
    markdown: MarkdownRenderer,
    policy: EmbedPolicy,
}

impl BodyRenderer {
    pub fn new(markdown: MarkdownRenderer, policy: EmbedPolicy) -> Self {
        Self { markdown, policy }
    }

    /// Build the renderer from site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            MarkdownRenderer::with_config(&config.markdown),
            EmbedPolicy::from_config(&config.embed),
        )
    }

    /// Render a post body
    pub fn render(&self, body: &PostBody) -> Result<RenderedBody> {
        let mut out = RenderedBody::default();

        if body.is_empty() {
            out.html.push_str("<p>No content available</p>\n");
            return Ok(out);
        }

        match body {
            PostBody::Markdown(text) => {
                let split = split(text);
                for segment in &split.segments {
                    self.render_segment(segment, &mut out)?;
                }
                out.unterminated = split.unterminated;
            }
            PostBody::RichText(doc) => self.render_rich_text(&doc.children, &mut out)?,
        }

        Ok(out)
    }

    /// Render one segment of a markdown body
    pub fn render_segment(&self, segment: &ContentSegment, out: &mut RenderedBody) -> Result<()> {
        match segment {
            ContentSegment::Markdown { text } => {
                out.html.push_str(&self.markdown.render(text)?);
            }
            ContentSegment::RawEmbed { html } => self.render_embed_block(html, out),
        }
        Ok(())
    }

    /// Render every iframe of a raw block; text around them is kept escaped
    pub fn render_embed_block(&self, html: &str, out: &mut RenderedBody) {
        for part in embed_block_parts(html, &self.policy.defaults) {
            match part {
                EmbedBlockPart::Text(text) => {
                    out.html.push_str(&format!("<p>{}</p>\n", escape_html(&text)));
                }
                EmbedBlockPart::Embed(request) => self.render_embed(request, out),
            }
        }
    }

    /// Validate an embed and append the iframe or its placeholder
    pub fn render_embed(&self, request: Result<EmbedRequest, EmbedError>, out: &mut RenderedBody) {
        let (src, verdict) = match &request {
            Ok(req) => (Some(req.src.clone()), self.policy.validate(&req.src)),
            Err(err) => (None, Verdict::Invalid(err.clone())),
        };

        let html = match (&request, &verdict) {
            (Ok(req), Verdict::Allowed { .. }) => iframe_html(req),
            (_, Verdict::Blocked { host, allowlist }) => blocked_placeholder(host, allowlist),
            (_, verdict) => invalid_placeholder(src.as_deref(), verdict),
        };

        tracing::debug!("Embed {:?}: {}", src, verdict);
        out.html.push_str(&html);
        out.html.push('\n');
        out.embeds.push(EmbedReport { src, verdict });
    }
}

/// Markup for an allowed embed
pub fn iframe_html(req: &EmbedRequest) -> String {
    let width = req.width.to_string();
    let height = req.height.to_string();
    let iframe = element(
        "iframe",
        &[
            ("src", Some(req.src.as_str())),
            ("title", Some(req.title.as_str())),
            ("width", Some(width.as_str())),
            ("height", Some(height.as_str())),
            ("frameborder", Some("0")),
            ("allow", Some(IFRAME_ALLOW)),
            ("referrerpolicy", Some("strict-origin-when-cross-origin")),
            ("allowfullscreen", None),
            (
                "style",
                Some("max-width: 100%; border: none; border-radius: 8px;"),
            ),
        ],
        "",
    );
    format!(r#"<div class="embed">{}</div>"#, iframe)
}

/// Placeholder for an embed whose host is not allowlisted
pub fn blocked_placeholder(host: &str, allowlist: &[String]) -> String {
    format!(
        r#"<div class="embed-blocked"><p>🚫 Embed not allowed from domain: {}</p><p>Allowed domains: {}</p></div>"#,
        escape_html(host),
        escape_html(&allowlist.join(", "))
    )
}

/// Placeholder for an embed that can never be rendered
pub fn invalid_placeholder(src: Option<&str>, verdict: &Verdict) -> String {
    let headline = match (src, verdict) {
        (Some(src), Verdict::Invalid(EmbedError::MalformedUrl(_))) => {
            format!("❌ Invalid URL: {}", escape_html(src))
        }
        (Some(src), Verdict::Invalid(err)) => {
            format!("❌ Invalid embed URL {}: {}", escape_html(src), err)
        }
        (None, Verdict::Invalid(err)) => format!("❌ Invalid embed: {}", err),
        (_, verdict) => format!("❌ Invalid embed: {}", verdict),
    };
    format!(
        r#"<div class="embed-invalid"><p>{}</p><p>Please provide a valid embed URL</p></div>"#,
        headline
    )
}
