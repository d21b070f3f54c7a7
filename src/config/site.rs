//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::embed::DEFAULT_ALLOWED_DOMAINS;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub language: String,
    pub timezone: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Date / Time format
    pub date_format: String,

    // Rendering
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Content Preview".to_string(),
            subtitle: String::new(),
            language: "en".to_string(),
            timezone: String::new(),

            content_dir: "content/posts".to_string(),
            public_dir: "public".to_string(),

            date_format: "MMM DD, YYYY".to_string(),

            markdown: MarkdownConfig::default(),
            embed: EmbedConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file, or TOML when the extension says so
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let config: SiteConfig = if is_toml {
            toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };
        Ok(config)
    }

    /// Find and load the config file in `base_dir`, falling back to defaults
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        for name in ["_config.yml", "_config.yaml", "_config.toml"] {
            let candidate = base_dir.as_ref().join(name);
            if candidate.exists() {
                tracing::debug!("Loading config from {:?}", candidate);
                return Self::load(&candidate);
            }
        }
        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Pass raw HTML in markdown through instead of escaping it
    pub raw_html: bool,
    pub highlight_theme: String,
    pub line_number: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            raw_html: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Iframe embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub allowed_domains: Vec<String>,
    pub default_width: u32,
    pub default_height: u32,
    pub default_title: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            default_width: 560,
            default_height: 315,
            default_title: "Embedded content".to_string(),
        }
    }
}
