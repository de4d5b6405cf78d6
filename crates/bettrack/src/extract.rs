//! Row-to-record extraction.
//!
//! Pure transforms from scraped rows to typed records. The production path
//! keeps only settled slips and drops rows it cannot key; the diagnostic scan
//! reports everything it sees, `open` slips included, and is never persisted.

use chrono::{DateTime, Utc};

use crate::normalize::{infer_profit, parse_amount};
use crate::source::RawRow;
use crate::types::{BetRecord, BetStatus, round2};

/// Rows dropped during extraction, by reason. Skips are silent by design;
/// these counters are the observability channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipStats {
    /// Fewer than two currency cells, or no status heading.
    pub missing_cells: usize,
    /// Status outside the settled set (`open`, unrecognized text).
    pub unsettled_status: usize,
    /// No slip id to key the record on.
    pub missing_slip_id: usize,
}

impl SkipStats {
    pub fn total(&self) -> usize {
        self.missing_cells + self.unsettled_status + self.missing_slip_id
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Extract settled records from scraped rows.
///
/// Source order is preserved and nothing is deduplicated here; that is the
/// merge step's job. Pure transform; persistence belongs to the caller.
pub fn extract_records(rows: &[RawRow], captured_at: DateTime<Utc>) -> (Vec<BetRecord>, SkipStats) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = SkipStats::default();
    let recorded_at = captured_at.to_rfc3339();

    for row in rows {
        let Some(status_text) = row.status.as_deref().filter(|_| row.currency_cells.len() >= 2)
        else {
            skipped.missing_cells += 1;
            continue;
        };
        let status_text = status_text.trim().to_lowercase();
        let Some(status) = BetStatus::parse(&status_text) else {
            skipped.unsettled_status += 1;
            continue;
        };
        let Some(slip_id) = row
            .slip_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            skipped.missing_slip_id += 1;
            continue;
        };

        let bet = parse_amount(&row.currency_cells[0]);
        let profit = infer_profit(parse_amount(&row.currency_cells[1]), bet, &status_text);

        records.push(BetRecord {
            game: row.game.clone().unwrap_or_default(),
            slip_id: slip_id.to_string(),
            bet: round2(bet),
            profit: round2(profit),
            status,
            created: row.created.clone().unwrap_or_default(),
            recorded_at: recorded_at.clone(),
        });
    }

    (records, skipped)
}

/// One row as the diagnostic scan sees it.
#[derive(Debug, Clone)]
pub struct ScannedRow {
    pub game: String,
    pub slip_id: String,
    pub bet: f64,
    pub profit: f64,
    /// Trimmed, lower-cased status text (any value, `open` included).
    pub status: String,
    pub created: String,
}

/// Read-only scan of every structurally complete row, regardless of status
/// or slip id. This is the console-inspection view of the table; nothing
/// from it reaches the store.
pub fn scan_rows(rows: &[RawRow]) -> (Vec<ScannedRow>, SkipStats) {
    let mut scanned = Vec::with_capacity(rows.len());
    let mut skipped = SkipStats::default();

    for row in rows {
        let Some(status_text) = row.status.as_deref().filter(|_| row.currency_cells.len() >= 2)
        else {
            skipped.missing_cells += 1;
            continue;
        };
        let status = status_text.trim().to_lowercase();

        let bet = parse_amount(&row.currency_cells[0]);
        let profit = infer_profit(parse_amount(&row.currency_cells[1]), bet, &status);

        scanned.push(ScannedRow {
            game: row.game.clone().unwrap_or_default(),
            slip_id: row.slip_id.clone().unwrap_or_default(),
            bet: round2(bet),
            profit: round2(profit),
            status,
            created: row.created.clone().unwrap_or_default(),
        });
    }

    (scanned, skipped)
}
