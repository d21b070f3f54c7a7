//! Post model

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::RichTextDocument;

/// A post body: markdown text or a structured rich-text document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostBody {
    Markdown(String),
    RichText(RichTextDocument),
}

impl PostBody {
    pub fn is_empty(&self) -> bool {
        match self {
            PostBody::Markdown(text) => text.trim().is_empty(),
            PostBody::RichText(doc) => doc.children.is_empty(),
        }
    }
}

impl Default for PostBody {
    fn default() -> Self {
        PostBody::Markdown(String::new())
    }
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Identifier, the source filename without extension
    pub id: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Author display name
    pub author: String,

    /// Post tags
    pub tags: Vec<String>,

    /// Whether the post is marked as featured
    pub featured: bool,

    /// Post body
    pub body: PostBody,

    /// Source file path (relative to the content directory)
    pub source: String,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(id: String, title: String, date: DateTime<Local>, source: String) -> Self {
        Self {
            id,
            title,
            date,
            author: String::new(),
            tags: Vec::new(),
            featured: false,
            body: PostBody::default(),
            source,
        }
    }

    /// URL-safe form of the id, used for output paths and routes
    pub fn slug(&self) -> String {
        slug::slugify(&self.id)
    }

    /// URL path of the post view
    pub fn path(&self) -> String {
        format!("/posts/{}/", self.slug())
    }
}

/// Find a post by its slug or its raw id
pub fn find_post<'a>(posts: &'a [Post], key: &str) -> Option<&'a Post> {
    posts
        .iter()
        .find(|p| p.slug() == key)
        .or_else(|| posts.iter().find(|p| p.id == key))
}
