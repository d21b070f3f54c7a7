//! Preview server with content reload

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::commands::generate::PageRenderer;
use crate::content::{find_post, Post};
use crate::Preview;

/// Posts and the renderer built from the config they were loaded with
pub struct Site {
    pages: PageRenderer,
    posts: Vec<Post>,
}

impl Site {
    /// Load the site; a failed post load leaves the list empty
    pub fn load(preview: &Preview) -> Result<Self> {
        let posts = preview.load_posts().unwrap_or_else(|e| {
            tracing::error!("Failed to load posts: {:#}", e);
            Vec::new()
        });
        Ok(Self {
            pages: PageRenderer::new(&preview.config)?,
            posts,
        })
    }

    /// The welcome page
    pub fn index_page(&self) -> Result<String> {
        self.pages.index(&self.posts)
    }

    /// The page of the post with the given slug, if one exists
    pub fn post_page(&self, slug: &str) -> Result<Option<String>> {
        match find_post(&self.posts, slug) {
            Some(post) => Ok(Some(self.pages.post(&self.posts, post)?.html)),
            None => Ok(None),
        }
    }
}

type SharedSite = Arc<RwLock<Site>>;

/// Build the application router
pub fn router(site: SharedSite) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Start the preview server
pub async fn start(preview: &Preview, ip: &str, port: u16, watch: bool) -> Result<()> {
    let site = Arc::new(RwLock::new(Site::load(preview)?));
    let app = router(site.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching for content changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let preview = preview.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(preview, site) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content and config, replacing the shared site on change
fn watch_and_reload(preview: Preview, site: SharedSite) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if preview.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&preview.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", preview.content_dir);
    }

    for name in ["_config.yml", "_config.yaml", "_config.toml"] {
        let config_path = preview.base_dir.join(name);
        if config_path.exists() {
            debouncer
                .watcher()
                .watch(&config_path, RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching: {:?}", config_path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path = e.path.to_string_lossy();
                        !path.contains(".git")
                            && !path.contains(".DS_Store")
                            && !path.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match reload(&preview, &site) {
                    Ok(count) => tracing::info!("Reloaded {} posts", count),
                    Err(e) => tracing::error!("Reload failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Re-read config and posts, then swap the shared site
fn reload(preview: &Preview, site: &SharedSite) -> Result<usize> {
    let preview = Preview::new(&preview.base_dir)?;
    let fresh = Site::load(&preview)?;
    let count = fresh.posts.len();

    let mut guard = site
        .write()
        .map_err(|_| anyhow::anyhow!("site lock poisoned"))?;
    *guard = fresh;
    Ok(count)
}

async fn index_handler(State(site): State<SharedSite>) -> Response {
    let page = match site.read() {
        Ok(site) => site.index_page(),
        Err(_) => Err(anyhow::anyhow!("site lock poisoned")),
    };
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => server_error(e),
    }
}

async fn post_handler(State(site): State<SharedSite>, Path(slug): Path<String>) -> Response {
    let page = match site.read() {
        Ok(site) => site.post_page(&slug),
        Err(_) => Err(anyhow::anyhow!("site lock poisoned")),
    };
    match page {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => {
            tracing::debug!("No post for slug {:?}", slug);
            (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
        }
        Err(e) => server_error(e),
    }
}

const NOT_FOUND_PAGE: &str =
    r#"<!DOCTYPE html><html><body><h1>Post not found</h1><p><a href="/">Back to all posts</a></p></body></html>"#;

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Render failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Render failed").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;
    use std::fs;
    use tempfile::TempDir;

    fn site(dir: &TempDir) -> (Preview, SharedSite) {
        init_site(dir.path()).unwrap();
        let preview = Preview::new(dir.path()).unwrap();
        let site = Arc::new(RwLock::new(Site::load(&preview).unwrap()));
        (preview, site)
    }

    #[test]
    fn test_pages_by_slug() {
        let dir = TempDir::new().unwrap();
        let (_, site) = site(&dir);
        let site = site.read().unwrap();

        assert!(site.index_page().unwrap().contains("Welcome to Your Content"));

        let page = site.post_page("hello-world").unwrap().unwrap();
        assert!(page.contains("Hello, World!"));
        assert!(page.contains(r#"<li class="active">"#));

        assert!(site.post_page("no-such-post").unwrap().is_none());
    }

    #[test]
    fn test_reload_replaces_posts_and_config() {
        let dir = TempDir::new().unwrap();
        let (preview, site) = site(&dir);
        assert_eq!(site.read().unwrap().posts.len(), 2);

        fs::write(
            preview.content_dir.join("third.md"),
            "---\ntitle: Third\n---\n<iframe src=\"https://loom.com/share/1\"></iframe>\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "embed:\n  allowed_domains: [loom.com]\n",
        )
        .unwrap();

        assert_eq!(reload(&preview, &site).unwrap(), 3);
        let page = site.read().unwrap().post_page("third").unwrap().unwrap();
        assert!(page.contains(r#"src="https://loom.com/share/1""#));
    }

    #[test]
    fn test_missing_content_dir_serves_empty_list() {
        let dir = TempDir::new().unwrap();
        let preview = Preview::new(dir.path()).unwrap();
        let site = Site::load(&preview).unwrap();
        assert!(site.posts.is_empty());
        assert!(site.index_page().unwrap().contains("No posts found."));
    }
}
