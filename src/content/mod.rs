//! Content module - posts, front-matter, rich-text documents and markdown

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod richtext;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{find_post, Post, PostBody};
pub use richtext::{RichTextDocument, RichTextNode};
