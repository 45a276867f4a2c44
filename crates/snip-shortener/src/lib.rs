//! URL shortening service.
//!
//! [`ShortenerService`] ties a storage backend to a code generator and
//! implements the [`snip_core::Shortener`] contract on top of them.

pub mod link;
pub mod service;

pub use link::{ShortLinkFormat, ShortLinkRoute};
pub use service::{ShortenerService, DEFAULT_MAX_ATTEMPTS};
