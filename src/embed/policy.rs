//! Domain allowlist and embed validation

use std::fmt;
use url::{Host, Url};

use super::EmbedError;
use crate::config::EmbedConfig;

/// Providers that may be embedded when no allowlist is configured
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "www.youtube.com",
    "api.leadconnectorhq.com",
    "maps.google.com",
    "www.google.com",
    "google.com",
    "vimeo.com",
    "player.vimeo.com",
    "calendly.com",
    "typeform.com",
];

/// A normalized set of hostnames and registered domains
///
/// A host is permitted when it equals an entry, or when it is a subdomain of
/// an entry (`player.vimeo.com` under `vimeo.com`). Matching always happens on
/// a label boundary, so `evilvimeo.com` never matches `vimeo.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    entries: Vec<String>,
}

impl Allowlist {
    /// Build an allowlist, normalizing and de-duplicating the entries
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for entry in entries {
            if let Some(entry) = normalize_entry(entry.as_ref()) {
                if !normalized.contains(&entry) {
                    normalized.push(entry);
                }
            }
        }
        Self {
            entries: normalized,
        }
    }

    /// The normalized entries, in configuration order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a hostname against the allowlist
    pub fn permits(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.entries.iter().any(|entry| {
            host == *entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS.iter().copied())
    }
}

impl<S: AsRef<str>> FromIterator<S> for Allowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    match host.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Normalize an allowlist entry; internationalized names are converted to
/// the punycode form that [`Url`] reports for hosts.
fn normalize_entry(entry: &str) -> Option<String> {
    let entry = normalize_host(entry);
    if entry.is_empty() {
        return None;
    }
    match Host::parse(&entry) {
        Ok(Host::Domain(domain)) => Some(domain),
        Ok(host) => Some(host.to_string()),
        Err(e) => {
            tracing::warn!("Allowlist entry {:?} is not a valid host: {}", entry, e);
            Some(entry)
        }
    }
}

/// Default iframe attributes used when an embed omits them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedDefaults {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for EmbedDefaults {
    fn default() -> Self {
        Self {
            width: 560,
            height: 315,
            title: "Embedded content".to_string(),
        }
    }
}

/// The outcome of validating one embed source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The iframe may be rendered
    Allowed { host: String },
    /// The host is not on the allowlist
    Blocked { host: String, allowlist: Vec<String> },
    /// The source can never be rendered
    Invalid(EmbedError),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed { .. })
    }

    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Allowed { .. } => "allowed",
            Verdict::Blocked { .. } => "blocked",
            Verdict::Invalid(_) => "invalid",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allowed { host } => write!(f, "allowed ({})", host),
            Verdict::Blocked { host, .. } => write!(f, "blocked: domain not allowed ({})", host),
            Verdict::Invalid(err) => write!(f, "invalid: {}", err),
        }
    }
}

/// Validate an embed source against an allowlist
pub fn validate(src: &str, allowlist: &Allowlist) -> Verdict {
    let url = match Url::parse(src.trim()) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Rejecting embed {:?}: {}", src, e);
            return Verdict::Invalid(EmbedError::MalformedUrl(src.to_string()));
        }
    };

    match url.scheme() {
        "http" | "https" => {}
        other => return Verdict::Invalid(EmbedError::UnsupportedScheme(other.to_string())),
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => normalize_host(host),
        _ => return Verdict::Invalid(EmbedError::MissingHost),
    };

    if allowlist.permits(&host) {
        Verdict::Allowed { host }
    } else {
        tracing::debug!("Embed host {} is not allowlisted", host);
        Verdict::Blocked {
            host,
            allowlist: allowlist.entries().to_vec(),
        }
    }
}

/// Allowlist plus attribute defaults, built once from configuration
#[derive(Debug, Clone, Default)]
pub struct EmbedPolicy {
    pub allowlist: Allowlist,
    pub defaults: EmbedDefaults,
}

impl EmbedPolicy {
    pub fn new(allowlist: Allowlist, defaults: EmbedDefaults) -> Self {
        Self {
            allowlist,
            defaults,
        }
    }

    /// Build the policy from the `embed` section of the site config
    pub fn from_config(config: &EmbedConfig) -> Self {
        let allowlist = Allowlist::new(&config.allowed_domains);
        if allowlist.is_empty() {
            tracing::warn!("Embed allowlist is empty, every iframe will be blocked");
        }
        Self {
            allowlist,
            defaults: EmbedDefaults {
                width: config.default_width,
                height: config.default_height,
                title: config.default_title.clone(),
            },
        }
    }

    pub fn validate(&self, src: &str) -> Verdict {
        validate(src, &self.allowlist)
    }
}
