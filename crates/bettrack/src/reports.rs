//! Report generation (CSV outputs).

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::Writer;

use crate::aggregate::{MonthBucket, monthly_breakdown};
use crate::types::BetRecord;

pub const RECORDS_FILENAME: &str = "records.csv";
pub const MONTHLY_FILENAME: &str = "monthly.csv";

/// Generate both CSV exports into `output_dir`.
pub fn generate_all_reports(
    output_dir: &Path,
    records: &[BetRecord],
    now: DateTime<Utc>,
    use_capture_date: bool,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    generate_records_csv(output_dir, records)?;
    let months = monthly_breakdown(records, now, use_capture_date);
    generate_monthly_csv(output_dir, &months)?;
    Ok(())
}

/// Generate records.csv (one row per stored slip).
fn generate_records_csv(output_dir: &Path, records: &[BetRecord]) -> Result<()> {
    let path = output_dir.join(RECORDS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Game",
        "Slip_ID",
        "Bet",
        "Profit",
        "Status",
        "Created",
        "Recorded_At",
    ])?;

    for r in records {
        wtr.write_record([
            r.game.as_str(),
            &r.slip_id,
            &format!("{:.2}", r.bet),
            &format!("{:.2}", r.profit),
            r.status.as_str(),
            &r.created,
            &r.recorded_at,
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate monthly.csv (one row per calendar month, newest first).
fn generate_monthly_csv(output_dir: &Path, months: &[MonthBucket]) -> Result<()> {
    let path = output_dir.join(MONTHLY_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([
        "Month",
        "Count",
        "Bet_Total",
        "Profit_Total",
        "Won_Count",
        "Won_Profit",
        "Lost_Count",
        "Lost_Profit",
        "Cancelled_Count",
        "Cancelled_Profit",
    ])?;

    for m in months {
        wtr.write_record([
            m.label.as_str(),
            &m.totals.count.to_string(),
            &format!("{:.2}", m.totals.bet_total),
            &format!("{:.2}", m.totals.profit_total),
            &m.won.count.to_string(),
            &format!("{:.2}", m.won.profit_total),
            &m.lost.count.to_string(),
            &format!("{:.2}", m.lost.profit_total),
            &m.cancelled.count.to_string(),
            &format!("{:.2}", m.cancelled.profit_total),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}
