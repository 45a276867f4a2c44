//! Pieces shared by the sqlx-backed repositories.

use jiff::Timestamp;
use snip_core::repository::Result;
use snip_core::{MappingId, ShortCode, StorageError, UrlMapping};

/// A row of the `urls` table. Timestamps are stored as unix microseconds.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MappingRow {
    id: i64,
    short_code: String,
    original_url: String,
    created_at: i64,
}

impl MappingRow {
    pub(crate) fn into_mapping(self) -> Result<UrlMapping> {
        Ok(UrlMapping {
            id: Some(MappingId::Numeric(self.id)),
            short_code: ShortCode::new_unchecked(self.short_code),
            original_url: self.original_url,
            created_at: parse_created_at(self.created_at)?,
        })
    }
}

/// Current server time, truncated to the precision the SQL backends keep.
pub(crate) fn now() -> Timestamp {
    let micros = Timestamp::now().as_microsecond();
    Timestamp::from_microsecond(micros).unwrap_or_else(|_| Timestamp::now())
}

pub(crate) fn parse_created_at(micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", micros))
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_round_trips_through_micros() {
        let ts = now();
        assert_eq!(parse_created_at(ts.as_microsecond()).unwrap(), ts);
    }

    #[test]
    fn out_of_range_created_at_is_invalid_data() {
        let err = parse_created_at(i64::MAX).unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn pool_errors_are_classified() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::InvalidData(_)
        ));
    }
}
