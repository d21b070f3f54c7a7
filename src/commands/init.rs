//! Initialize a new preview site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: Content Preview
subtitle: Powered by TinaMCP
language: en
timezone: ''

# Directory
content_dir: content/posts
public_dir: public

# Date / Time format
date_format: MMM DD, YYYY

# Rendering
markdown:
  raw_html: true
  highlight_theme: base16-ocean.dark
  line_number: false

# Iframe embeds: hosts not listed here (or subdomains of them) are blocked
embed:
  allowed_domains:
    - youtube.com
    - youtu.be
    - www.youtube.com
    - api.leadconnectorhq.com
    - maps.google.com
    - www.google.com
    - google.com
    - vimeo.com
    - player.vimeo.com
    - calendly.com
    - typeform.com
  default_width: 560
  default_height: 315
  default_title: Embedded content
"#;

const HELLO_WORLD: &str = r#"---
title: Hello, World!
date: 2025-09-19T10:00:00.000Z
author: TinaCMS Team
tags:
  - Getting Started
  - TinaCMS
featured: false
---

## Hello World!

This is your first post. Edit it in the CMS or directly in
`content/posts/hello-world.md`.

Embeds from allowed domains render inline:

<iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ" title="Getting started video" width="560" height="315"></iframe>

Anything else is replaced by a notice:

<iframe src="https://tracker.example.net/widget"></iframe>
"#;

const TINAMCP_POWER: &str = r#"---
title: The Power of TinaMCP for Simple Content Management in Local Businesses
date: 2025-09-19T16:00:00.000Z
author: Content Manager
tags:
  - TinaMCP
  - Local Business
  - Content Management
featured: true
---

# The Power of TinaMCP for Simple Content Management in Local Businesses

Local businesses need professional, maintainable websites but often lack the
technical resources of larger companies.

## Git-Based Simplicity

Content lives in simple files that can be version-controlled and backed up
easily. No database complexity or server maintenance headaches.

## Programmatic Access

- Bulk content updates
- Automated report generation
- Scheduled content publishing

<iframe
  src="https://player.vimeo.com/video/76979871"
  title="TinaMCP walkthrough"
  width="640"
  height="360">
</iframe>
"#;

/// Initialize a new site in the given directory
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let posts_dir = target_dir.join("content/posts");
    fs::create_dir_all(&posts_dir)?;

    write_if_missing(&target_dir.join("_config.yml"), CONFIG)?;
    write_if_missing(&posts_dir.join("hello-world.md"), HELLO_WORLD)?;
    write_if_missing(&posts_dir.join("tinamcp-power.md"), TINAMCP_POWER)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::embed::DEFAULT_ALLOWED_DOMAINS;
    use crate::Preview;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let preview = Preview::new(dir.path()).unwrap();
        assert_eq!(preview.config.subtitle, "Powered by TinaMCP");
        assert_eq!(
            preview.config.embed.allowed_domains,
            DEFAULT_ALLOWED_DOMAINS
        );

        let posts = preview.load_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "tinamcp-power");
        assert!(posts[0].featured);
        assert_eq!(posts[1].tags, vec!["Getting Started", "TinaCMS"]);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.title, "Mine");
    }
}
