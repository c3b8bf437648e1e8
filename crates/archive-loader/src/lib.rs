//! Archive loading pipeline.
//!
//! Replays an archive directory into a search engine: index metadata is
//! applied first, documents are bulk-written, and the loaded indices are
//! refreshed (and migrated, for internal indices) once everything is in.
//!
//! ## Key Components
//!
//! - [`LoadRequest`]: what to load and how
//! - [`Stage`]: one step of the record pipeline
//! - [`IndexCreationStage`]: creates, skips or replaces target indices
//! - [`DocumentIndexingStage`]: batches documents into bulk writes
//! - [`Pipeline`]: connects the archive reader to the stages
//! - [`StatsLedger`] / [`LoadResult`]: per-index outcome
//! - [`reconcile`]: post-load refresh and migration
//! - [`load`] / [`unload`]: the two actions
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use archive_loader::{load, LoadRequest};
//!
//! let request = LoadRequest::new("logs", "/srv/archives").with_skip_existing(true);
//! let result = load(&request, Arc::new(client), Arc::new(migrator)).await?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```

pub mod create_index;
pub mod error;
pub mod index_docs;
pub mod load;
pub mod pipeline;
pub mod reconcile;
pub mod request;
pub mod stage;
pub mod stats;
pub mod unload;

#[cfg(test)]
mod test_support;

pub use create_index::IndexCreationStage;
pub use error::LoadError;
pub use index_docs::DocumentIndexingStage;
pub use load::load;
pub use pipeline::Pipeline;
pub use reconcile::{reconcile, ReconcileOutcome};
pub use request::LoadRequest;
pub use stage::Stage;
pub use stats::{DocStats, IndexStats, LoadResult, StatsLedger};
pub use unload::{unload, IndexDeletionStage};
