use crate::sql::{self, MappingRow};
use async_trait::async_trait;
use snip_core::repository::{Repository, Result};
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const SCHEMA: &str = include_str!("../ddl/postgres/urls.sql");

/// PostgreSQL implementation of the repository contract.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new PostgreSQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(sql::map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn initialize(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(sql::map_sqlx_error)?;
        Ok(())
    }

    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<UrlMapping> {
        let created_at = sql::now();

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO urls (short_code, original_url, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(code.as_str())
        .bind(original_url)
        .bind(created_at.as_microsecond())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(UrlMapping {
                id: Some(MappingId::Numeric(id)),
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
            WHERE short_code = $1
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
            WHERE short_code = $1
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
