//! Generate the static preview

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::render::BodyRenderer;
use crate::templates::TemplateRenderer;
use crate::Preview;

/// Generate `index.html` plus one page per post into the public directory
pub fn run(preview: &Preview) -> Result<()> {
    let start = std::time::Instant::now();

    let posts = preview.load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    let pages = PageRenderer::new(&preview.config)?;
    write_file(
        &preview.public_dir.join("index.html"),
        &pages.index(&posts)?,
    )?;

    let mut flagged = 0;
    for post in &posts {
        let page = pages.post(&posts, post)?;
        if page.has_problems {
            flagged += 1;
        }
        let path = preview
            .public_dir
            .join("posts")
            .join(post.slug())
            .join("index.html");
        write_file(&path, &page.html)?;
    }

    if flagged > 0 {
        tracing::warn!(
            "{} post(s) have blocked or invalid embeds; run `check` for details",
            flagged
        );
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Renders full preview pages; shared by `generate` and the server
pub struct PageRenderer {
    config: SiteConfig,
    body: BodyRenderer,
    templates: TemplateRenderer,
}

/// One rendered post page
pub struct PostPage {
    pub html: String,
    pub has_problems: bool,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            body: BodyRenderer::from_config(config),
            templates: TemplateRenderer::new()?,
        })
    }

    /// The welcome page
    pub fn index(&self, posts: &[Post]) -> Result<String> {
        self.templates.render_index(&self.config, posts)
    }

    /// The page of one post
    pub fn post(&self, posts: &[Post], post: &Post) -> Result<PostPage> {
        let rendered = self
            .body
            .render(&post.body)
            .with_context(|| format!("Failed to render {}", post.source))?;
        let html = self
            .templates
            .render_post(&self.config, posts, post, &rendered.html)?;

        Ok(PostPage {
            html,
            has_problems: rendered.has_problems(),
        })
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_index_and_posts() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let preview = Preview::new(dir.path()).unwrap();

        run(&preview).unwrap();

        let index = fs::read_to_string(preview.public_dir.join("index.html")).unwrap();
        assert!(index.contains("Welcome to Your Content"));
        assert!(index.contains(r#"href="/posts/hello-world/""#));

        let hello =
            fs::read_to_string(preview.public_dir.join("posts/hello-world/index.html")).unwrap();
        assert!(hello.contains(r#"src="https://www.youtube.com/embed/dQw4w9WgXcQ""#));
        assert!(hello.contains("Embed not allowed from domain: tracker.example.net"));
        assert!(!hello.contains("tracker.example.net/widget\""));

        let power =
            fs::read_to_string(preview.public_dir.join("posts/tinamcp-power/index.html")).unwrap();
        assert!(power.contains(r#"src="https://player.vimeo.com/video/76979871""#));
        assert!(power.contains(r#"width="640""#));
    }

    #[test]
    fn test_slugified_output_path() {
        let dir = TempDir::new().unwrap();
        let posts_dir = dir.path().join("content/posts");
        fs::create_dir_all(&posts_dir).unwrap();
        fs::write(posts_dir.join("Launch Notes.md"), "---\ntitle: Launch\n---\nHi\n").unwrap();

        let preview = Preview::new(dir.path()).unwrap();
        run(&preview).unwrap();
        assert!(preview
            .public_dir
            .join("posts/launch-notes/index.html")
            .exists());
    }
}
