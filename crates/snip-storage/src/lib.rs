//! Storage backends for the snip URL shortener.
//!
//! Every backend implements [`Repository`]. One backend is chosen at process
//! start; the rest of the stack is generic over it.

pub mod document;
pub mod dynamodb;
pub mod memory;
pub mod mysql;
pub mod postgres;
mod sql;
pub mod sqlite;

pub use document::DocumentRepository;
pub use dynamodb::DynamoDbRepository;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use postgres::PostgresRepository;
pub use snip_core::repository::{Repository, Result};
pub use snip_core::StorageError;
pub use sqlite::SqliteRepository;
