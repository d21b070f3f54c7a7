//! Render one post body to HTML

use anyhow::Result;

use crate::content::find_post;
use crate::render::RenderedBody;
use crate::Preview;

/// Print the rendered body of the post with the given slug or id
pub fn run(preview: &Preview, key: &str) -> Result<()> {
    let rendered = render_post(preview, key)?;
    print!("{}", rendered.html);
    Ok(())
}

/// Render the body of the post with the given slug or id
pub fn render_post(preview: &Preview, key: &str) -> Result<RenderedBody> {
    let posts = preview.load_posts()?;
    let Some(post) = find_post(&posts, key) else {
        anyhow::bail!("No post with id or slug {:?}", key);
    };

    tracing::debug!("Rendering {} from {}", post.id, post.source);
    preview.body_renderer().render(&post.body)
}
