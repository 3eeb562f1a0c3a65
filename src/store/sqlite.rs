//! SQLite work-queue implementation

use crate::store::traits::{StoreError, StoreResult, UrlStore};
use crate::store::{IngestSummary, UrlRecord, UrlStatus, SCHEMA_SQL};
use crate::CourierError;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// SQLite work-queue backend
///
/// Holds the claim cursor for the current run: `claim_next` walks the queue
/// in stored order and never revisits a row within one run, even if the
/// caller did not mark it indexed.
pub struct SqliteStore {
    conn: Connection,
    claim_cursor: i64,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`
    ///
    /// Opening does not create the queue table; run the `init` action first
    /// on a fresh database.
    pub fn open(path: &Path) -> Result<Self, CourierError> {
        let conn = Connection::open(path)?;

        // Durability/performance settings: WAL keeps status updates durable
        // without a full fsync per write
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Ok(Self {
            conn,
            claim_cursor: 0,
        })
    }

    /// Creates an in-memory queue with the schema applied (for testing)
    pub fn open_in_memory() -> Result<Self, CourierError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            claim_cursor: 0,
        })
    }

    /// Destructively (re)creates the work-queue table from the given DDL
    ///
    /// Existing rows are lost. Intended for one-time setup only.
    pub fn init_from_schema(&mut self, schema_sql: &str) -> StoreResult<()> {
        self.conn.execute_batch(schema_sql)?;
        self.claim_cursor = 0;
        Ok(())
    }

    /// Inserts a batch of URLs in `new` status
    ///
    /// Each URL is trimmed of surrounding whitespace; blank entries are
    /// dropped before they count as attempts. A URL already present in the
    /// queue increments `skipped` rather than failing the batch. Progress is
    /// logged every `log_every` attempts; a zero interval is treated as 1.
    pub fn bulk_insert<I>(&mut self, urls: I, log_every: u64) -> StoreResult<IngestSummary>
    where
        I: IntoIterator<Item = String>,
    {
        let log_every = log_every.max(1);
        let mut summary = IngestSummary::default();
        let now = Utc::now().to_rfc3339();

        for line in urls {
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            summary.total += 1;
            tracing::debug!("Ingesting url: {}", url);

            let inserted = self.conn.execute(
                "INSERT INTO indexing_urls (url, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![url, UrlStatus::New.to_db_string(), now, now],
            );

            match inserted {
                Ok(_) => summary.added += 1,
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    tracing::debug!("URL {} is already in the queue", url);
                    summary.skipped += 1;
                }
                Err(e) => return Err(StoreError::Sqlite(e)),
            }

            if summary.total % log_every == 0 {
                tracing::info!(
                    "Ingested {} urls so far. Added: {}, skipped: {}",
                    summary.total,
                    summary.added,
                    summary.skipped
                );
            }
        }

        tracing::info!(
            "Ingestion finished: {} urls total. Added: {}, skipped: {}",
            summary.total,
            summary.added,
            summary.skipped
        );
        Ok(summary)
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<UrlRecord> {
        Ok(UrlRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            status: UrlStatus::from_db_string(&row.get::<_, String>(2)?)
                .unwrap_or(UrlStatus::New),
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl UrlStore for SqliteStore {
    fn claim_next(&mut self) -> StoreResult<Option<String>> {
        let next: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, url FROM indexing_urls
                 WHERE status = ?1 AND id > ?2
                 ORDER BY id LIMIT 1",
                params![UrlStatus::New.to_db_string(), self.claim_cursor],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match next {
            Some((id, url)) => {
                self.claim_cursor = id;
                Ok(Some(url))
            }
            None => Ok(None),
        }
    }

    fn mark_indexed(&mut self, url: &str) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE indexing_urls SET status = ?1, updated_at = ?2 WHERE url = ?3",
            params![UrlStatus::SentToIndex.to_db_string(), now, url],
        )?;

        if changed == 0 {
            return Err(StoreError::UrlNotFound(url.to_string()));
        }
        Ok(())
    }

    fn count_by_status(&self, status: UrlStatus) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM indexing_urls WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM indexing_urls", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn all_records(&self) -> StoreResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, status, created_at, updated_at FROM indexing_urls ORDER BY id",
        )?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
