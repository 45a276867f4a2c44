use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use snip_core::repository::{sort_newest_first, Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

/// In-memory implementation of the [`Repository`] trait using DashMap.
///
/// Insertion goes through the entry API so the uniqueness check and the
/// write happen under the same shard lock. Ids come from a process-local
/// counter, mirroring an autoincrement column.
#[derive(Debug)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlMapping>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping> {
        match self.storage.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let mapping = UrlMapping {
                    id: Some(MappingId::Numeric(id)),
                    short_code: code.clone(),
                    original_url: original_url.to_owned(),
                    created_at: Timestamp::now(),
                };
                slot.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let mut mappings: Vec<UrlMapping> = self
            .storage
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut mappings);
        Ok(mappings)
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }

    async fn shutdown(&self) -> Result<()> {
        debug!(mappings = self.storage.len(), "in-memory repository shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryRepository::new();

        let created = repo.insert(&code("abc1"), "https://example.com").await.unwrap();
        assert_eq!(created.id, Some(MappingId::Numeric(1)));

        let result = repo.get(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(result, created);
        assert_eq!(result.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.get(&code("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc1"), "https://example.com").await.unwrap();

        let err = repo
            .insert(&code("abc1"), "https://other.com")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        let kept = repo.get(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(kept.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn codes_are_case_sensitive() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abcd"), "https://lower.example").await.unwrap();
        repo.insert(&code("ABCD"), "https://upper.example").await.unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn exists_checks() {
        let repo = InMemoryRepository::new();

        assert!(!repo.exists(&code("abc1")).await.unwrap());

        repo.insert(&code("abc1"), "https://example.com").await.unwrap();

        assert!(repo.exists(&code("abc1")).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("aaaa"), "https://a.example").await.unwrap();
        repo.insert(&code("bbbb"), "https://b.example").await.unwrap();
        repo.insert(&code("cccc"), "https://c.example").await.unwrap();

        let codes: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.short_code.to_string())
            .collect();
        assert_eq!(codes, ["cccc", "bbbb", "aaaa"]);
    }

    #[tokio::test]
    async fn shutdown_is_repeatable() {
        let repo = InMemoryRepository::new();
        repo.shutdown().await.unwrap();
        repo.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_code_admit_one() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(&code("same"), &format!("https://example{}.com", i))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }
}
