use crate::sql::{self, MappingRow};
use async_trait::async_trait;
use snip_core::repository::{Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = include_str!("../ddl/sqlite/urls.sql");

/// Embedded, file-backed implementation of the repository contract.
///
/// The database file is created on first connect. Uniqueness of short codes
/// is enforced by the `UNIQUE` constraint on `urls.short_code`.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database file at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(sql::map_sqlx_error)?;

        debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn initialize(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(sql::map_sqlx_error)?;
        Ok(())
    }

    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping> {
        let created_at = sql::now();

        let result = sqlx::query(
            r#"
            INSERT INTO urls (short_code, original_url, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(original_url)
        .bind(created_at.as_microsecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(UrlMapping {
                id: Some(MappingId::Numeric(done.last_insert_rowid())),
                short_code: code.clone(),
                original_url: original_url.to_owned(),
                created_at,
            }),
            Err(err) if sql::is_unique_violation(&err) => {
                Err(StorageError::Conflict(code.to_string()))
            }
            Err(err) => Err(sql::map_sqlx_error(err)),
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, short_code, original_url, created_at
            FROM urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(sql::map_sqlx_error)?;

        row.map(MappingRow::into_mapping).transpose()
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT id, short_code, original_url, created_at
            FROM urls
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(sql::map_sqlx_error)?
        .into_iter()
        .map(MappingRow::into_mapping)
        .collect()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(sql::map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn shutdown(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
