//! Statistics reporting over the work queue
//!
//! Simple reads of the queue for the `stats` action: aggregate counts and an
//! optional per-row dump.

use crate::store::{UrlStatus, UrlStore};
use crate::CourierError;
use std::io::Write;

/// Aggregate counts for the current state of the queue
#[derive(Debug, Clone, Copy)]
pub struct QueueStatistics {
    pub total: u64,
    pub pending: u64,
    pub sent: u64,
}

/// Loads statistics from the work queue
pub fn load_statistics(store: &dyn UrlStore) -> Result<QueueStatistics, CourierError> {
    Ok(QueueStatistics {
        total: store.count_total()?,
        pending: store.count_by_status(UrlStatus::New)?,
        sent: store.count_by_status(UrlStatus::SentToIndex)?,
    })
}

/// Prints aggregate statistics to stdout
pub fn print_statistics(stats: &QueueStatistics) {
    println!("=== Queue Statistics ===\n");
    println!("Total URLs:     {}", stats.total);
    println!("Pending (new):  {}", stats.pending);
    println!("Sent to index:  {}", stats.sent);

    let percentage = if stats.total > 0 {
        (stats.sent as f64 / stats.total as f64) * 100.0
    } else {
        0.0
    };
    println!("\nProgress: {:.1}% submitted", percentage);
}

/// Writes one line per queue row to the given sink
///
/// Recommended for file output; large queues produce a lot of lines.
pub fn write_detailed(store: &dyn UrlStore, out: &mut dyn Write) -> Result<(), CourierError> {
    for record in store.all_records()? {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            record.url,
            record.status.to_db_string(),
            record.created_at,
            record.updated_at
        )?;
    }
    Ok(())
}
