//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the types shared by the storage backends, the
//! shortening service and the HTTP gateway.

pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{sort_newest_first, MappingId, Repository, UrlMapping};
pub use shortcode::ShortCode;
pub use shortener::{ExpandedUrl, ListedUrl, ShortenedUrl, Shortener};
