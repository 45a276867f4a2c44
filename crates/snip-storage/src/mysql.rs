use crate::sql::{self, MappingRow};
use async_trait::async_trait;
use snip_core::repository::{Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use sqlx::MySqlPool;

const SCHEMA: &str = include_str!("../ddl/mysql/urls.sql");

/// MySQL implementation of the repository contract.
///
/// The table uses a binary collation so that short codes differing only in
/// case are distinct keys.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(sql::map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for MySqlRepository {
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
            Ok(done) => {
                let id = i64::try_from(done.last_insert_id()).map_err(|e| {
                    StorageError::InvalidData(format!("insert id out of range: {e}"))
                })?;
                Ok(UrlMapping {
                    id: Some(MappingId::Numeric(id)),
                    short_code: code.clone(),
                    original_url: original_url.to_owned(),
                    created_at,
                })
            }
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
