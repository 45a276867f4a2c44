//! Cloud document store backend.
//!
//! Each mapping is one JSON document at `{prefix}/urls/{code}.json` in any
//! store the `object_store` crate speaks: S3, Azure Blob, the local
//! filesystem, or memory. Inserts are conditional writes (`PutMode::Create`,
//! i.e. `If-None-Match: *`), so the store itself rejects duplicate codes.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use jiff::Timestamp;
use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutMode, PutOptions, PutPayload};
use serde::{Deserialize, Serialize};
use snip_core::repository::{sort_newest_first, Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

const COLLECTION: &str = "urls";
const FETCH_CONCURRENCY: usize = 16;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrlDocument {
    id: String,
    short_code: String,
    original_url: String,
    created_at: Timestamp,
}

impl UrlDocument {
    fn into_mapping(self) -> UrlMapping {
        UrlMapping {
            id: Some(MappingId::Key(self.id)),
            short_code: ShortCode::new_unchecked(self.short_code),
            original_url: self.original_url,
            created_at: self.created_at,
        }
    }
}

/// A [`Repository`] storing one JSON document per mapping in object storage.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    store: Arc<dyn ObjectStore>,
    collection: ObjectPath,
}

impl DocumentRepository {
    /// Wraps an existing store; documents live under `{prefix}/urls/`.
    pub fn new(store: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        let collection = ObjectPath::from(prefix.trim_matches('/')).child(COLLECTION);
        Self { store, collection }
    }

    /// Builds a store from a location URL.
    ///
    /// Supported forms:
    /// - `s3://bucket/prefix` (credentials and region from `AWS_*` variables)
    /// - `az://container/prefix` (credentials from `AZURE_*` variables)
    /// - `file:///absolute/dir` (created if missing)
    /// - `memory://` (process-local, for development)
    pub async fn connect(location: &str) -> Result<Self> {
        let url = Url::parse(location).map_err(|e| {
            StorageError::Operation(format!("invalid object store url '{location}': {e}"))
        })?;
        let prefix = url.path().trim_matches('/').to_owned();

        let (store, prefix): (Arc<dyn ObjectStore>, String) = match url.scheme() {
            "s3" => {
                let store = AmazonS3Builder::from_env()
                    .with_bucket_name(required_host(&url)?)
                    .with_conditional_put(S3ConditionalPut::ETagMatch)
                    .build()
                    .map_err(map_store_error)?;
                (Arc::new(store), prefix)
            }
            "az" | "azure" => {
                let store = MicrosoftAzureBuilder::from_env()
                    .with_container_name(required_host(&url)?)
                    .build()
                    .map_err(map_store_error)?;
                (Arc::new(store), prefix)
            }
            "file" => {
                let root = url.to_file_path().map_err(|_| {
                    StorageError::Operation(format!("invalid file location '{location}'"))
                })?;
                tokio::fs::create_dir_all(&root).await.map_err(|e| {
                    StorageError::Unavailable(format!("cannot create '{}': {e}", root.display()))
                })?;
                let store = LocalFileSystem::new_with_prefix(&root).map_err(map_store_error)?;
                (Arc::new(store), String::new())
            }
            "memory" => (Arc::new(InMemory::new()), prefix),
            other => {
                return Err(StorageError::Operation(format!(
                    "unsupported object store scheme '{other}'"
                )))
            }
        };

        debug!(store = %store, prefix = %prefix, "object store configured");
        Ok(Self::new(store, &prefix))
    }

    fn document_path(&self, code: &ShortCode) -> ObjectPath {
        self.collection.child(format!("{code}.json"))
    }

    async fn read(&self, path: &ObjectPath) -> Result<Option<UrlMapping>> {
        let result = match self.store.get(path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(map_store_error(err)),
        };
        let bytes = result.bytes().await.map_err(map_store_error)?;
        let document: UrlDocument = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::InvalidData(format!("malformed document at '{path}': {e}"))
        })?;
        Ok(Some(document.into_mapping()))
    }
}

fn required_host(url: &Url) -> Result<&str> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| StorageError::Operation(format!("object store url '{url}' has no bucket")))
}

fn map_store_error(err: object_store::Error) -> StorageError {
    let message = err.to_string();

    match err {
        object_store::Error::AlreadyExists { .. } | object_store::Error::Precondition { .. } => {
            StorageError::Conflict(message)
        }
        object_store::Error::Generic { .. } => StorageError::Unavailable(message),
        _ => StorageError::Operation(message),
    }
}

#[async_trait]
impl Repository for DocumentRepository {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn initialize(&self) -> Result<()> {
        // Object stores have no schema; listing proves the bucket is reachable
        // with the configured credentials.
        self.store
            .list_with_delimiter(Some(&self.collection))
            .await
            .map_err(map_store_error)?;
        info!("document collection ready");
        Ok(())
    }

    #[instrument(skip(self, original_url), fields(code = %code))]
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping> {
        let document = UrlDocument {
            id: code.to_string(),
            short_code: code.to_string(),
            original_url: original_url.to_owned(),
            created_at: Timestamp::now(),
        };
        let payload = serde_json::to_vec(&document)
            .map_err(|e| StorageError::InvalidData(format!("cannot encode document: {e}")))?;
        let opts = PutOptions {
            mode: PutMode::Create,
            ..Default::default()
        };

        match self
            .store
            .put_opts(&self.document_path(code), PutPayload::from(payload), opts)
            .await
        {
            Ok(_) => Ok(document.into_mapping()),
            Err(object_store::Error::AlreadyExists { .. })
            | Err(object_store::Error::Precondition { .. }) => {
                Err(StorageError::Conflict(code.to_string()))
            }
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        self.read(&self.document_path(code)).await
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let metas: Vec<ObjectMeta> = self
            .store
            .list(Some(&self.collection))
            .try_collect()
            .await
            .map_err(map_store_error)?;

        let documents: Vec<Option<UrlMapping>> = futures::stream::iter(
            metas
                .into_iter()
                .filter(|meta| meta.location.extension() == Some("json")),
        )
        .map(|meta| async move { self.read(&meta.location).await })
        .buffer_unordered(FETCH_CONCURRENCY)
        .try_collect()
        .await?;

        let mut mappings: Vec<UrlMapping> = documents.into_iter().flatten().collect();
        sort_newest_first(&mut mappings);
        Ok(mappings)
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        match self.store.head(&self.document_path(code)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn repo() -> DocumentRepository {
        DocumentRepository::new(Arc::new(InMemory::new()), "tenant")
    }

    fn code(value: &str) -> ShortCode {
        ShortCode::new_unchecked(value)
    }

    #[test]
    fn documents_live_under_prefixed_collection() {
        let repo = repo();
        assert_eq!(
            repo.document_path(&code("aB3x")).to_string(),
            "tenant/urls/aB3x.json"
        );

        let bare = DocumentRepository::new(Arc::new(InMemory::new()), "");
        assert_eq!(bare.document_path(&code("aB3x")).to_string(), "urls/aB3x.json");
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = repo();
        repo.initialize().await.unwrap();

        let created = repo.insert(&code("aB3x"), "https://example.com/page").await.unwrap();
        assert_eq!(created.id, Some(MappingId::Key("aB3x".into())));

        let got = repo.get(&code("aB3x")).await.unwrap().unwrap();
        assert_eq!(got, created);
    }

    #[tokio::test]
    async fn missing_code_is_absent() {
        let repo = repo();
        assert!(repo.get(&code("nope")).await.unwrap().is_none());
        assert!(!repo.exists(&code("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let repo = repo();
        repo.insert(&code("aB3x"), "https://one.example").await.unwrap();

        let err = repo.insert(&code("aB3x"), "https://two.example").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let kept = repo.get(&code("aB3x")).await.unwrap().unwrap();
        assert_eq!(kept.original_url, "https://one.example");
    }

    #[tokio::test]
    async fn list_is_newest_first_and_skips_foreign_objects() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let repo = DocumentRepository::new(store.clone(), "");

        repo.insert(&code("aaaa"), "https://a.example").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        repo.insert(&code("bbbb"), "https://b.example").await.unwrap();
        store
            .put(&ObjectPath::from("urls/README.txt"), PutPayload::from_static(b"hi"))
            .await
            .unwrap();

        let codes: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.short_code.to_string())
            .collect();
        assert_eq!(codes, ["bbbb", "aaaa"]);
    }

    #[tokio::test]
    async fn malformed_document_is_invalid_data() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let repo = DocumentRepository::new(store.clone(), "");
        store
            .put(&ObjectPath::from("urls/bad1.json"), PutPayload::from_static(b"{"))
            .await
            .unwrap();

        let err = repo.get(&code("bad1")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[tokio::test]
    async fn connect_memory_scheme() {
        let repo = DocumentRepository::connect("memory://").await.unwrap();
        repo.initialize().await.unwrap();
        repo.insert(&code("mem1"), "https://example.com").await.unwrap();
        assert!(repo.exists(&code("mem1")).await.unwrap());
    }

    #[tokio::test]
    async fn connect_file_scheme_persists_documents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let location = Url::from_directory_path(&root).unwrap().to_string();

        let repo = DocumentRepository::connect(&location).await.unwrap();
        repo.initialize().await.unwrap();
        repo.insert(&code("file"), "https://example.com").await.unwrap();

        assert!(root.join("urls").join("file.json").exists());

        let reopened = DocumentRepository::connect(&location).await.unwrap();
        let got = reopened.get(&code("file")).await.unwrap().unwrap();
        assert_eq!(got.original_url, "https://example.com");

        let err = reopened.insert(&code("file"), "https://again.example").await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn connect_rejects_unknown_scheme() {
        let err = DocumentRepository::connect("ftp://host/path").await.unwrap_err();
        assert!(matches!(err, StorageError::Operation(_)));
    }
}
