//! Work-queue schema definition
//!
//! The queue is a single table keyed by URL. Status values are stored as the
//! strings `new` and `sent_to_index` so databases written by earlier runs of
//! the tool stay readable.

/// SQL executed by the `init` action. Drops any existing queue first, so it
/// is strictly a one-time bootstrap, never part of the steady-state loop.
pub const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS indexing_urls;

CREATE TABLE indexing_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX idx_indexing_urls_status ON indexing_urls(status);
"#;
