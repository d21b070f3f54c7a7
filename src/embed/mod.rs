//! Embed module - iframe allowlisting, body splitting and attribute extraction
//!
//! Post bodies written as markdown may carry raw `<iframe>` blocks. The
//! [`split`] scanner separates those blocks from the surrounding markdown,
//! [`extract_embed_attributes`] reads the iframe attributes, and
//! [`EmbedPolicy::validate`] decides whether the source may be rendered.

mod attributes;
mod policy;
mod splitter;

use thiserror::Error;

pub use attributes::{
    embed_block_parts, extract_embed_attributes, extract_embed_attributes_with, EmbedBlockPart,
    EmbedRequest,
};
pub use policy::{validate, Allowlist, EmbedDefaults, EmbedPolicy, Verdict, DEFAULT_ALLOWED_DOMAINS};
pub use splitter::{split, ContentSegment, SplitResult};

/// Reasons an embed can never be rendered, regardless of the allowlist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmbedError {
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("missing src")]
    MissingSrc,
}
