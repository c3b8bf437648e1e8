//! Destination engine access for the archive loader.
//!
//! [`EngineClient`] covers the index and document operations a load needs;
//! [`Migrator`] triggers the platform's internal index migration.
//! [`HttpEngineClient`] and [`HttpMigrator`] talk to real servers, while
//! [`MockEngine`] and [`MockMigrator`] keep everything in memory.

pub mod client;
pub mod error;
pub mod http;
pub mod mock;

pub use client::{BulkAction, BulkItem, BulkOperation, BulkResponse, EngineClient, Migrator};
pub use error::EngineError;
pub use http::{EngineClientConfig, HttpEngineClient, HttpMigrator, MigratorConfig};
pub use mock::{EngineCall, MockEngine, MockMigrator};
