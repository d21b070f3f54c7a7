//! Built-in preview templates using the Tera template engine
//!
//! The two-pane layout (post list on the left, selected post or welcome
//! panel on the right) is embedded in the binary. Autoescaping stays on for
//! `.html` templates; only the already-gated body HTML is marked safe.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_xml, format_date_in};

/// Template renderer with the embedded preview layout
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("preview/layout.html")),
            ("index.html", include_str!("preview/index.html")),
            ("post.html", include_str!("preview/post.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the welcome view: the post list and content counts
    pub fn render_index(&self, config: &SiteConfig, posts: &[Post]) -> Result<String> {
        let mut context = self.base_context(config, posts);
        context.insert("selected", &Option::<PostSummary>::None);
        context.insert(
            "stats",
            &Stats {
                posts: posts.len(),
                featured: posts.iter().filter(|p| p.featured).count(),
            },
        );
        self.render("index.html", &context)
    }

    /// Render the view of one post with its rendered body
    pub fn render_post(
        &self,
        config: &SiteConfig,
        posts: &[Post],
        post: &Post,
        body_html: &str,
    ) -> Result<String> {
        let mut context = self.base_context(config, posts);
        context.insert("selected", &PostSummary::from_post(post, config));
        context.insert("body", body_html);
        self.render("post.html", &context)
    }

    fn base_context(&self, config: &SiteConfig, posts: &[Post]) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        let summaries: Vec<PostSummary> = posts
            .iter()
            .map(|p| PostSummary::from_post(p, config))
            .collect();
        context.insert("posts", &summaries);
        context
    }
}

/// Site-level template data
#[derive(Debug, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub language: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            language: config.language.clone(),
        }
    }
}

/// Post data exposed to templates
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub path: String,
    pub title: String,
    /// Display date in the configured format and timezone
    pub date: String,
    pub date_iso: String,
    pub author: String,
    pub featured: bool,
    pub tags: Vec<String>,
}

impl PostSummary {
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug(),
            path: post.path(),
            title: post.title.clone(),
            date: format_date_in(&post.date, &config.date_format, &config.timezone),
            date_iso: date_xml(&post.date),
            author: post.author.clone(),
            featured: post.featured,
            tags: post.tags.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Stats {
    posts: usize,
    featured: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn post(id: &str, featured: bool) -> Post {
        let date = Local.with_ymd_and_hms(2025, 9, 19, 10, 0, 0).unwrap();
        let mut post = Post::new(
            id.to_string(),
            format!("Title of {}", id),
            date,
            format!("{}.md", id),
        );
        post.featured = featured;
        post.author = "Ada".to_string();
        post.tags = vec!["rust".to_string()];
        post
    }

    #[test]
    fn test_index_lists_posts_and_counts() {
        let renderer = TemplateRenderer::new().unwrap();
        let posts = vec![post("one", true), post("two", false)];
        let html = renderer
            .render_index(&SiteConfig::default(), &posts)
            .unwrap();

        assert!(html.contains("Welcome to Your Content"));
        assert!(html.contains(r#"href="/posts/one/""#));
        assert!(html.contains("Title of two"));
        assert!(html.contains("<strong>2</strong>"));
        assert!(html.contains("<strong>1</strong>"));
        assert!(html.contains("Sep 19, 2025"));
    }

    #[test]
    fn test_empty_site_has_notice() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_index(&SiteConfig::default(), &[]).unwrap();
        assert!(html.contains("No posts found."));
    }

    #[test]
    fn test_post_view_marks_selection_and_keeps_body() {
        let renderer = TemplateRenderer::new().unwrap();
        let posts = vec![post("one", true), post("two", false)];
        let html = renderer
            .render_post(
                &SiteConfig::default(),
                &posts,
                &posts[1],
                r#"<div class="embed"><iframe src="https://vimeo.com/1"></iframe></div>"#,
            )
            .unwrap();

        assert!(html.contains(r#"<li class="active">"#));
        assert_eq!(html.matches(r#"class="active""#).count(), 1);
        assert!(html.contains(r#"<iframe src="https://vimeo.com/1"></iframe>"#));
        assert!(html.contains("By Ada"));
        assert!(html.contains(r#"<span class="tag">rust</span>"#));
    }

    #[test]
    fn test_metadata_is_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut p = post("x", false);
        p.title = "<script>alert(1)</script>".to_string();
        let html = renderer
            .render_post(&SiteConfig::default(), &[p.clone()], &p, "")
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
