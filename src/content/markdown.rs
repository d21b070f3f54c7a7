//! Markdown to HTML with syntect-highlighted code blocks

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::MarkdownConfig;
use crate::helpers::escape_html;

const PARSER_OPTIONS: Options = Options::ENABLE_TABLES
    .union(Options::ENABLE_FOOTNOTES)
    .union(Options::ENABLE_STRIKETHROUGH)
    .union(Options::ENABLE_TASKLISTS)
    .union(Options::ENABLE_SMART_PUNCTUATION)
    .union(Options::ENABLE_GFM);

/// Renders markdown segments of post bodies
pub struct MarkdownRenderer {
    syntaxes: SyntaxSet,
    /// `None` when no highlighting theme could be loaded
    theme: Option<Theme>,
    line_numbers: bool,
    raw_html: bool,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_config(&MarkdownConfig::default())
    }

    /// Create from the `markdown` section of the site config
    pub fn with_config(config: &MarkdownConfig) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(&config.highlight_theme) {
            Some(theme) => Some(theme),
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using the first bundled one",
                    config.highlight_theme
                );
                themes.into_values().next()
            }
        };

        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_number,
            raw_html: config.raw_html,
        }
    }

    /// Render a markdown fragment
    pub fn render(&self, markdown: &str) -> Result<String> {
        let mut events: Vec<Event> = Vec::new();
        // Set while inside a code block: (fence language, collected source)
        let mut open_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(markdown, PARSER_OPTIONS) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    open_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, source)) = open_block.take() {
                        let html = self.highlight_code(&source, lang.as_deref());
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                event => match open_block.as_mut() {
                    Some((_, source)) => {
                        if let Event::Text(text) = event {
                            source.push_str(&text);
                        }
                    }
                    None => match event {
                        Event::Html(raw) | Event::InlineHtml(raw) if !self.raw_html => {
                            events.push(Event::Text(raw))
                        }
                        event => events.push(event),
                    },
                },
            }
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        Ok(out)
    }

    /// Whether raw HTML passes through unescaped
    pub fn allows_raw_html(&self) -> bool {
        self.raw_html
    }

    /// Highlight one code block; unknown languages fall back to plain text
    pub fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let syntax = self
            .syntaxes
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let highlighted = self
            .theme
            .as_ref()
            .and_then(|theme| highlighted_html_for_string(code, &self.syntaxes, syntax, theme).ok());

        match highlighted {
            Some(html) if self.line_numbers => with_gutter(&html, lang),
            Some(html) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                escape_html(lang),
                html
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap highlighted code in a table with a line-number gutter
fn with_gutter(code: &str, lang: &str) -> String {
    let count = code.lines().count();
    let gutter: Vec<String> = (1..=count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect();

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        escape_html(lang),
        gutter.join("\n"),
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_config(&MarkdownConfig {
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```\na\nb\n```").unwrap();
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_raw_html_toggle() {
        let md = "<div class=\"note\">hi</div>\n";

        let html = MarkdownRenderer::new().render(md).unwrap();
        assert!(html.contains("<div class=\"note\">"));

        let escaping = MarkdownRenderer::with_config(&MarkdownConfig {
            raw_html: false,
            ..Default::default()
        });
        let html = escaping.render(md).unwrap();
        assert!(html.contains("&lt;div"));
        assert!(!html.contains("<div class=\"note\">"));
    }
}
