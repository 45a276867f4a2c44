use crate::link::ShortLinkFormat;
use async_trait::async_trait;
use snip_core::{
    ExpandedUrl, ListedUrl, Repository, ShortCode, ShortenedUrl, Shortener, ShortenerError,
    StorageError,
};
use snip_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

/// Total number of candidate codes tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - Candidate generation with a bounded collision retry
/// - Short link composition
///
/// Each attempt draws a fresh code and checks it with `exists`. A `Conflict`
/// from `insert` means another request claimed the code in between; it uses
/// up an attempt like any other collision.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    links: ShortLinkFormat,
    max_attempts: usize,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            links: self.links.clone(),
            max_attempts: self.max_attempts,
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G, links: ShortLinkFormat) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            links,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the attempt budget. At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn links(&self) -> &ShortLinkFormat {
        &self.links
    }

    /// Prepares the backing store. Safe to call on every start.
    pub async fn initialize(&self) -> Result<(), ShortenerError> {
        self.repository.initialize().await?;
        Ok(())
    }

    /// Releases the backend's connections.
    pub async fn shutdown(&self) -> Result<(), ShortenerError> {
        self.repository.shutdown().await?;
        Ok(())
    }

    /// Accepts absolute URLs that can carry a path, such as `http`, `https`
    /// or `ftp`. Opaque forms like `mailto:` or `javascript:` are rejected.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidInput("URL is required".to_string()));
        }

        match Url::parse(url) {
            Ok(parsed) if !parsed.cannot_be_a_base() => Ok(()),
            Ok(_) | Err(_) => Err(ShortenerError::InvalidInput(
                "Invalid URL provided".to_string(),
            )),
        }
    }

    fn generate_code(&self) -> ShortCode {
        self.generator.generate().into()
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    #[instrument(skip(self))]
    async fn shorten(&self, original_url: &str) -> Result<ShortenedUrl, ShortenerError> {
        Self::validate_url(original_url)?;

        for attempt in 1..=self.max_attempts {
            let code = self.generate_code();

            if self.repository.exists(&code).await? {
                trace!(code = %code, attempt, "short code collision");
                continue;
            }

            match self.repository.insert(&code, original_url).await {
                Ok(mapping) => {
                    info!(code = %mapping.short_code, attempt, "created short url");
                    return Ok(ShortenedUrl {
                        short_url: self.links.link(&mapping.short_code),
                        short_code: mapping.short_code,
                        original_url: mapping.original_url,
                    });
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(code = %code, attempt, "short code claimed concurrently");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShortenerError::ExhaustedRetries {
            attempts: self.max_attempts,
        })
    }

    async fn expand(&self, code: &str) -> Result<ExpandedUrl, ShortenerError> {
        let code = ShortCode::new(code)?;

        match self.repository.get(&code).await? {
            Some(mapping) => {
                debug!(code = %code, "expanded short code");
                Ok(ExpandedUrl {
                    short_code: mapping.short_code,
                    original_url: mapping.original_url,
                    created_at: mapping.created_at,
                })
            }
            None => Err(ShortenerError::NotFound(code.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<ListedUrl>, ShortenerError> {
        let mappings = self.repository.list().await?;

        Ok(mappings
            .into_iter()
            .map(|mapping| ListedUrl {
                short_url: self.links.link(&mapping.short_code),
                short_code: mapping.short_code,
                original_url: mapping.original_url,
                created_at: mapping.created_at,
            })
            .collect())
    }
}
