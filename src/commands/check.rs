//! Audit the embeds of every post

use anyhow::Result;
use std::fmt::Write;

use crate::content::Post;
use crate::render::{BodyRenderer, RenderedBody};
use crate::Preview;

/// Check all posts, failing in strict mode when any embed needs attention
pub fn run(preview: &Preview, strict: bool) -> Result<()> {
    let posts = preview.load_posts()?;
    let report = check_posts(&posts, &preview.body_renderer())?;
    print!("{}", report.text);

    if report.problems > 0 {
        if strict {
            anyhow::bail!("{} post(s) have embed problems", report.problems);
        }
        tracing::warn!("{} post(s) have embed problems", report.problems);
    }
    Ok(())
}

/// Outcome of checking a set of posts
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Human-readable report
    pub text: String,
    /// Number of posts with a blocked or invalid embed or an open iframe block
    pub problems: usize,
}

pub fn check_posts(posts: &[Post], renderer: &BodyRenderer) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    for post in posts {
        let rendered = renderer.render(&post.body)?;
        if rendered.has_problems() {
            report.problems += 1;
        }
        write_post_report(&mut report.text, post, &rendered)?;
    }

    writeln!(
        report.text,
        "{} post(s) checked, {} with problems",
        posts.len(),
        report.problems
    )?;
    Ok(report)
}

fn write_post_report(out: &mut String, post: &Post, rendered: &RenderedBody) -> Result<()> {
    let status = if rendered.has_problems() { "!!" } else { "ok" };
    writeln!(
        out,
        "[{}] {} ({} embed(s))",
        status,
        post.source,
        rendered.embeds.len()
    )?;

    for embed in &rendered.embeds {
        writeln!(
            out,
            "    {}: {}",
            embed.src.as_deref().unwrap_or("<no src>"),
            embed.verdict
        )?;
    }
    if let Some(line) = rendered.unterminated {
        writeln!(out, "    unterminated <iframe> block starting at line {}", line)?;
    }
    Ok(())
}
