use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Outcome of shortening a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortenedUrl {
    pub short_code: ShortCode,
    pub original_url: String,
    /// The full short link, composed from the configured base URL.
    pub short_url: String,
}

/// A resolved short code.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedUrl {
    pub short_code: ShortCode,
    pub original_url: String,
    pub created_at: Timestamp,
}

/// One entry of the mapping listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedUrl {
    pub short_code: ShortCode,
    pub original_url: String,
    pub short_url: String,
    pub created_at: Timestamp,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a new mapping for `original_url` under a freshly generated code.
    async fn shorten(&self, original_url: &str) -> Result<ShortenedUrl>;

    /// Resolves a raw short code to its mapping.
    ///
    /// Fails with `InvalidInput` for an empty or malformed code and with
    /// `NotFound` when no mapping exists.
    async fn expand(&self, code: &str) -> Result<ExpandedUrl>;

    /// Lists every mapping, newest first.
    async fn list(&self) -> Result<Vec<ListedUrl>>;
}
