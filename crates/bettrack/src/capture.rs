//! The capture trigger: scrape → merge → persist → report.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::aggregate::{StatusSummary, status_summary};
use crate::extract::{SkipStats, extract_records};
use crate::source::RawRow;
use crate::store::{LedgerStore, merge_records};

/// Result of one capture cycle, reported back to the caller.
#[derive(Debug)]
pub struct CaptureReport {
    pub new_records: usize,
    pub updated_records: usize,
    pub total_records: usize,
    /// Status totals over the full merged collection.
    pub totals: StatusSummary,
    /// Rows the extractor dropped, by reason.
    pub skipped: SkipStats,
}

/// Run one extract → merge → save cycle against the store.
///
/// The merged collection is computed in memory and written once; a failing
/// save leaves the stored collection untouched. Callers must not overlap
/// capture cycles on the same store.
pub async fn capture_rows<S: LedgerStore>(
    store: &S,
    rows: &[RawRow],
    captured_at: DateTime<Utc>,
) -> Result<CaptureReport> {
    let (records, skipped) = extract_records(rows, captured_at);

    let mut collection = store.load_all().await?;
    let outcome = merge_records(&mut collection, records);
    store.save_all(&collection).await?;

    Ok(CaptureReport {
        new_records: outcome.new_records,
        updated_records: outcome.updated_records,
        total_records: collection.len(),
        totals: status_summary(&collection),
        skipped,
    })
}
