//! Disposable database servers for integration tests.
//!
//! Each fixture starts a container on construction and stops it when dropped.

pub mod dynamodb;
pub mod error;
pub mod mysql;
pub mod postgres;

pub use error::{Result, TestInfraError};
