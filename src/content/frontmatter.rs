//! Front-matter parsing

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            // Null entries in the CMS tag list are dropped
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<Option<String>>()? {
                if let Some(item) = item {
                    vec.push(item);
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data of a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub tags: Vec<String>,
    pub featured: bool,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();

        if trimmed.starts_with("---") {
            return Self::parse_yaml(content, trimmed);
        }

        if trimmed.starts_with(";;;") {
            return Self::parse_json(trimmed);
        }

        // No front-matter found
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml<'a>(original: &'a str, content: &'a str) -> Result<(Self, &'a str)> {
        let rest = content[3..].trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            // No closing ---, treat as no front-matter
            return Ok((FrontMatter::default(), original));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading thematic break followed by prose is not front-matter
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), original));
        }

        match serde_yaml::from_str::<FrontMatter>(yaml_content) {
            Ok(fm) => Ok((fm, remaining)),
            Err(e) => Err(anyhow!("Failed to parse YAML front-matter: {}", e)),
        }
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        let rest = &content[3..];
        let end_pos = rest
            .find(";;;")
            .ok_or_else(|| anyhow!("Unterminated JSON front-matter"))?;

        let json_content = rest[..end_pos].trim();
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        // JSON front-matter may omit the surrounding braces
        let fm: FrontMatter = if json_content.starts_with('{') {
            serde_json::from_str(json_content)
        } else {
            serde_json::from_str(&format!("{{{}}}", json_content))
        }
        .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?;

        Ok((fm, remaining))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Whether a block has at least one `key: value` line
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a date string: RFC 3339 / ISO 8601 first, then common local formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello, World!
date: 2025-09-19T10:00:00.000Z
author: TinaCMS Team
tags:
  - Getting Started
  - TinaCMS
featured: false
---

## Hello World!
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello, World!"));
        assert_eq!(fm.author.as_deref(), Some("TinaCMS Team"));
        assert_eq!(fm.tags, vec!["Getting Started", "TinaCMS"]);
        assert!(!fm.featured);
        assert!(remaining.starts_with("## Hello World!"));

        let date = fm.parse_date().unwrap().with_timezone(&Utc);
        assert_eq!(date.to_rfc3339(), "2025-09-19T10:00:00+00:00");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = ";;;\n\"title\": \"Json Post\", \"featured\": true\n;;;\nBody text.\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Json Post"));
        assert!(fm.featured);
        assert_eq!(remaining, "Body text.\n");
    }

    #[test]
    fn test_single_string_and_null_tags() {
        let (fm, _) = FrontMatter::parse("---\ntitle: T\ntags: Notes\n---\nx").unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);

        let (fm, _) = FrontMatter::parse("---\ntitle: T\ntags:\n  - a\n  - ~\n---\nx").unwrap();
        assert_eq!(fm.tags, vec!["a"]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let content = "---\ntitle: T\nheroImage: /img/a.png\nseo:\n  index: false\n---\nx";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("T"));
        assert_eq!(remaining, "x");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\nText.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_thematic_break_not_yaml() {
        let content = "---\n\nSome prose with https://example.com links.\n\n---\nMore.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let d = parse_date_string("2024-01-15 10:30:00").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let d = parse_date_string("2024/01/15").unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2024-01-15");

        assert!(parse_date_string("yesterday").is_none());
    }
}
