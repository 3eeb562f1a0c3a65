//! Storage trait and error types
//!
//! The trait covers exactly what the submission loop and the statistics
//! report need from the work queue; ingestion and schema bootstrap are
//! inherent operations on the concrete backend.

use crate::store::{UrlRecord, UrlStatus};
use thiserror::Error;

/// Errors that can occur during work-queue operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("URL not found in queue: {0}")]
    UrlNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for work-queue operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for work-queue backends
///
/// A single run holds one forward cursor over the queue: each URL still in
/// `new` status is yielded at most once per run, in stored order.
pub trait UrlStore {
    /// Returns the next URL in `new` status, or `None` when the queue is
    /// exhausted for this run. The returned URL is not locked; this is a
    /// single-consumer design.
    fn claim_next(&mut self) -> StoreResult<Option<String>>;

    /// Durably transitions a URL to `sent_to_index` and refreshes its
    /// `updated_at` timestamp. The transition happens exactly once; a URL
    /// never moves back to `new`.
    fn mark_indexed(&mut self, url: &str) -> StoreResult<()>;

    /// Counts URLs currently in the given status
    fn count_by_status(&self, status: UrlStatus) -> StoreResult<u64>;

    /// Counts all URLs in the queue
    fn count_total(&self) -> StoreResult<u64>;

    /// Returns every record in stored order, for the statistics report
    fn all_records(&self) -> StoreResult<Vec<UrlRecord>>;
}
