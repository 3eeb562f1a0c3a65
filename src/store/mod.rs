//! Work-queue persistence
//!
//! This module owns the SQLite table that tracks which URLs have already been
//! sent to the indexing endpoint, including:
//! - Destructive one-time schema bootstrap
//! - Bulk URL ingestion with duplicate detection
//! - Forward-cursor claiming of unindexed URLs
//! - Durable status transitions for resumption

mod schema;
mod sqlite;
mod traits;

pub use schema::SCHEMA_SQL;
pub use sqlite::SqliteStore;
pub use traits::{StoreError, StoreResult, UrlStore};

/// Status of a URL in the work queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlStatus {
    /// Ingested but not yet submitted
    New,
    /// Accepted by the indexing endpoint
    SentToIndex,
}

impl UrlStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::SentToIndex => "sent_to_index",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "sent_to_index" => Some(Self::SentToIndex),
            _ => None,
        }
    }
}

/// A row of the work queue
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub status: UrlStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Counters returned by bulk ingestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// URLs newly inserted in `new` status
    pub added: u64,
    /// URLs already present, counted instead of surfaced as errors
    pub skipped: u64,
    /// Total insert attempts
    pub total: u64,
}
