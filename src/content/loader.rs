//! Content loader - loads posts from the content directory

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::frontmatter::{parse_date_string, string_list};
use super::{FrontMatter, Post, PostBody};
use crate::Preview;

/// A post record exported by the CMS as JSON
#[derive(Debug, Deserialize)]
struct PostRecord {
    title: Option<String>,
    date: Option<String>,
    author: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    tags: Vec<String>,
    #[serde(default)]
    featured: Option<bool>,
    #[serde(default)]
    body: Option<PostBody>,
}

/// Loads posts from the content directory
pub struct ContentLoader {
    content_dir: PathBuf,
}

impl ContentLoader {
    /// Create a loader for the site's configured content directory
    pub fn new(preview: &Preview) -> Self {
        Self::from_dir(&preview.content_dir)
    }

    /// Create a loader for an explicit directory
    pub fn from_dir<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
        }
    }

    /// Load all posts, newest first
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        if !self.content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", self.content_dir);
            return Ok(Vec::new());
        }

        let mut posts: Vec<Post> = Vec::new();

        for entry in WalkDir::new(&self.content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let loaded = match content_kind(path) {
                Some(ContentKind::Markdown) => self.load_markdown_post(path),
                Some(ContentKind::Json) => self.load_json_post(path),
                None => continue,
            };

            match loaded {
                Ok(post) => {
                    if let Some(existing) = posts.iter().find(|p| p.id == post.id) {
                        tracing::warn!(
                            "Skipping {:?}: id {:?} already used by {}",
                            path,
                            post.id,
                            existing.source
                        );
                        continue;
                    }
                    // Output paths and routes are keyed by slug
                    let slug = post.slug();
                    if let Some(existing) = posts.iter().find(|p| p.slug() == slug) {
                        tracing::warn!(
                            "Skipping {:?}: slug {:?} already used by {}",
                            path,
                            slug,
                            existing.source
                        );
                        continue;
                    }
                    posts.push(post);
                }
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {:#}", path, e);
                }
            }
        }

        // Sort by date descending (newest first)
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.content_dir);
        Ok(posts)
    }

    /// Load the post with the given id, if present
    pub fn load_post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.load_posts()?.into_iter().find(|p| p.id == id))
    }

    /// Load a markdown post with front-matter
    fn load_markdown_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = fm
            .parse_date()
            .unwrap_or_else(|| file_modified(path).unwrap_or_else(Local::now));

        let mut post = self.new_post(path, fm.title, date);
        post.author = fm.author.unwrap_or_default();
        post.tags = fm.tags;
        post.featured = fm.featured;
        post.body = PostBody::Markdown(body.to_string());

        Ok(post)
    }

    /// Load a JSON post record whose body is markdown or a rich-text document
    fn load_json_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let record: PostRecord = serde_json::from_str(&content)
            .with_context(|| format!("Invalid post record in {}", path.display()))?;

        let date = record
            .date
            .as_deref()
            .and_then(parse_date_string)
            .unwrap_or_else(|| file_modified(path).unwrap_or_else(Local::now));

        let mut post = self.new_post(path, record.title, date);
        post.author = record.author.unwrap_or_default();
        post.tags = record.tags;
        post.featured = record.featured.unwrap_or(false);
        post.body = record.body.unwrap_or_default();

        Ok(post)
    }

    fn new_post(&self, path: &Path, title: Option<String>, date: DateTime<Local>) -> Post {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        let source = path
            .strip_prefix(&self.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        Post::new(id, title, date, source)
    }
}

enum ContentKind {
    Markdown,
    Json,
}

fn content_kind(path: &Path) -> Option<ContentKind> {
    match path.extension().and_then(|e| e.to_str())? {
        "md" | "markdown" | "mdx" => Some(ContentKind::Markdown),
        "json" => Some(ContentKind::Json),
        _ => None,
    }
}

fn file_modified(path: &Path) -> Option<DateTime<Local>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::richtext::NodeKind;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_posts_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "hello-world.md",
            "---\ntitle: Hello, World!\ndate: 2025-09-19T10:00:00.000Z\nauthor: TinaCMS Team\ntags:\n  - TinaCMS\n---\n\n## Hello\n",
        );
        write(
            dir.path(),
            "tinamcp-power.md",
            "---\ntitle: Power\ndate: 2025-09-19T16:00:00.000Z\nfeatured: true\n---\n\nBody\n",
        );

        let posts = ContentLoader::from_dir(dir.path()).load_posts().unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["tinamcp-power", "hello-world"]);

        let hello = &posts[1];
        assert_eq!(hello.title, "Hello, World!");
        assert_eq!(hello.author, "TinaCMS Team");
        assert_eq!(hello.tags, vec!["TinaCMS"]);
        assert!(!hello.featured);
        assert_eq!(hello.source, "hello-world.md");
        assert_eq!(hello.body, PostBody::Markdown("## Hello\n".to_string()));
        assert!(posts[0].featured);
    }

    #[test]
    fn test_load_json_rich_text_post() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "embedded.json",
            r#"{
                "title": "Embedded",
                "date": "2025-09-20T08:00:00.000Z",
                "tags": ["Video", null],
                "body": {
                    "type": "root",
                    "children": [
                        {"type": "p", "children": [{"type": "text", "text": "Watch:"}]}
                    ]
                }
            }"#,
        );

        let posts = ContentLoader::from_dir(dir.path()).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, "embedded");
        assert_eq!(post.tags, vec!["Video"]);
        assert!(post.author.is_empty());
        match &post.body {
            PostBody::RichText(doc) => {
                assert_eq!(doc.children[0].node_kind(), NodeKind::Paragraph)
            }
            other => panic!("expected rich text, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.md", "---\ntitle: Good\n---\nok\n");
        write(dir.path(), "broken.json", "{ not json");
        write(dir.path(), "broken.md", "---\ntitle: [oops\n---\nbody\n");
        write(dir.path(), "notes.txt", "ignored");

        let posts = ContentLoader::from_dir(dir.path()).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Good");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "same.json", r#"{"title": "From json"}"#);
        write(dir.path(), "same.md", "---\ntitle: From markdown\n---\n");

        let posts = ContentLoader::from_dir(dir.path()).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "From json");
    }

    #[test]
    fn test_colliding_slugs_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Hello World.md", "---\ntitle: First\n---\n");
        write(dir.path(), "hello-world.md", "---\ntitle: Second\n---\n");

        let posts = ContentLoader::from_dir(dir.path()).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "Hello World");
        assert_eq!(posts[0].title, "First");
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "untitled-note.md", "Just text.\n");

        let post = ContentLoader::from_dir(dir.path())
            .load_post("untitled-note")
            .unwrap()
            .unwrap();
        assert_eq!(post.title, "untitled-note");
        assert_eq!(post.body, PostBody::Markdown("Just text.\n".to_string()));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let posts = ContentLoader::from_dir(dir.path().join("nope"))
            .load_posts()
            .unwrap();
        assert!(posts.is_empty());
    }
}
