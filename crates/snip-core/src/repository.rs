use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Backend-assigned identifier of a mapping.
///
/// Relational backends hand out autoincrement ids; document and table
/// stores key rows by the short code itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingId {
    Numeric(i64),
    Key(String),
}

impl Display for MappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingId::Numeric(id) => write!(f, "{}", id),
            MappingId::Key(key) => f.write_str(key),
        }
    }
}

/// A stored short code to URL mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Backend identifier, if the backend assigns one.
    pub id: Option<MappingId>,
    /// The unique short code.
    pub short_code: ShortCode,
    /// The original URL exactly as it was submitted.
    pub original_url: String,
    /// Server time at which the mapping was created.
    pub created_at: Timestamp,
}

/// Orders mappings newest first, breaking ties on the identifier.
pub fn sort_newest_first(mappings: &mut [UrlMapping]) {
    mappings.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// The storage contract every backend implements.
///
/// Uniqueness of short codes is enforced here, not by callers: `insert`
/// must fail with [`StorageError::Conflict`] when the code is taken.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Ensures the backing table/collection exists. Safe to call on every start.
    async fn initialize(&self) -> Result<()>;

    /// Inserts a new mapping stamped with the current server time.
    /// Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping>;

    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Returns every mapping, newest first.
    async fn list(&self) -> Result<Vec<UrlMapping>>;

    /// Checks whether a short code already exists.
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.get(code).await?.is_some())
    }

    /// Releases connections and handles. Safe to call more than once.
    async fn shutdown(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn mapping(code: &str, id: Option<MappingId>, created_at: Timestamp) -> UrlMapping {
        UrlMapping {
            id,
            short_code: ShortCode::new_unchecked(code),
            original_url: format!("https://example.com/{code}"),
            created_at,
        }
    }

    #[test]
    fn newest_first_orders_by_created_at() {
        let t0 = Timestamp::from_second(1_700_000_000).unwrap();
        let t1 = t0 + SignedDuration::from_secs(1);
        let mut mappings = vec![mapping("aaaa", None, t0), mapping("bbbb", None, t1)];

        sort_newest_first(&mut mappings);

        assert_eq!(mappings[0].short_code.as_str(), "bbbb");
        assert_eq!(mappings[1].short_code.as_str(), "aaaa");
    }

    #[test]
    fn newest_first_breaks_ties_on_id() {
        let t0 = Timestamp::from_second(1_700_000_000).unwrap();
        let mut mappings = vec![
            mapping("aaaa", Some(MappingId::Numeric(1)), t0),
            mapping("bbbb", Some(MappingId::Numeric(2)), t0),
        ];

        sort_newest_first(&mut mappings);

        assert_eq!(mappings[0].short_code.as_str(), "bbbb");
    }

    #[test]
    fn mapping_id_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&MappingId::Numeric(7)).unwrap(),
            "7"
        );
        assert_eq!(
            serde_json::to_string(&MappingId::Key("aB3x".into())).unwrap(),
            "\"aB3x\""
        );
    }
}
