//! List site content

use anyhow::Result;
use indexmap::IndexMap;
use std::fmt::Write;

use crate::content::Post;
use crate::Preview;

/// List site content by type
pub fn run(preview: &Preview, content_type: &str) -> Result<()> {
    let posts = preview.load_posts()?;
    print!("{}", format_listing(&posts, content_type)?);
    Ok(())
}

/// Format the listing of one content type
pub fn format_listing(posts: &[Post], content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(out, "{}", post_line(post))?;
            }
        }
        "featured" => {
            let featured: Vec<_> = posts.iter().filter(|p| p.featured).collect();
            writeln!(out, "Featured ({}):", featured.len())?;
            for post in featured {
                writeln!(out, "{}", post_line(post))?;
            }
        }
        "tag" | "tags" => {
            let mut tags: IndexMap<&str, usize> = IndexMap::new();
            for post in posts {
                for tag in &post.tags {
                    *tags.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
            // Stable sort keeps first-seen order among equal counts
            tags.sort_by(|_, a, _, b| b.cmp(a));

            writeln!(out, "Tags ({}):", tags.len())?;
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, featured",
                content_type
            );
        }
    }

    Ok(out)
}

fn post_line(post: &Post) -> String {
    let mut line = format!(
        "  {} - {} [{}]",
        post.date.format("%Y-%m-%d"),
        post.title,
        post.source
    );
    if post.featured {
        line.push_str(" *");
    }
    line
}
