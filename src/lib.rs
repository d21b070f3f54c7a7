//! cms-preview: a preview front-end for git-backed CMS content
//!
//! Posts are loaded from a content directory, their bodies rendered to HTML,
//! and every iframe a body carries is checked against a domain allowlist
//! before it is allowed into the page. Blocked and invalid embeds render as
//! visible placeholders instead.

pub mod commands;
pub mod config;
pub mod content;
pub mod embed;
pub mod helpers;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The preview application rooted at a site directory
#[derive(Debug, Clone)]
pub struct Preview {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory posts are loaded from
    pub content_dir: PathBuf,
    /// Output directory of `generate`
    pub public_dir: PathBuf,
}

impl Preview {
    /// Open the site in `base_dir`, loading its config file when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::discover(&base_dir)?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Build from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Load all posts, newest first
    pub fn load_posts(&self) -> Result<Vec<content::Post>> {
        content::loader::ContentLoader::new(self).load_posts()
    }

    /// A body renderer configured from the site config
    pub fn body_renderer(&self) -> render::BodyRenderer {
        render::BodyRenderer::from_config(&self.config)
    }

    /// Generate the static preview
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
