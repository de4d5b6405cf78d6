//! bettrack: CSGOEmpire match-betting history tracker.
//!
//! Scrapes slip rows from a saved page snapshot (or the live page), merges
//! them into a local ledger keyed by slip id, and reports status and monthly
//! aggregates.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use bettrack::aggregate::{StatusSummary, effective_date, monthly_breakdown, recent_records, status_summary};
use bettrack::capture::{CaptureReport, capture_rows};
use bettrack::config::FileConfig;
use bettrack::extract::{SkipStats, scan_rows};
use bettrack::reports::generate_all_reports;
use bettrack::source::{self, RawRow};
use bettrack::store::{LedgerStore, MemoryStore, SqliteStore};

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "bettrack")]
#[command(about = "Track and aggregate CSGOEmpire match-betting history")]
struct Args {
    /// Ledger database path (overrides config.toml)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a history page and merge its slips into the ledger
    Capture {
        /// Saved page snapshot to parse
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Fetch this URL instead of reading a snapshot
        #[arg(long)]
        url: Option<String>,

        /// Merge in memory and report, without touching the ledger
        #[arg(long)]
        dry_run: bool,
    },

    /// Print status-partitioned totals for the stored collection
    Summary,

    /// Print the monthly breakdown, newest month first
    Monthly {
        /// Bucket by capture time instead of the slip's own date
        #[arg(long)]
        by_capture_date: bool,
    },

    /// Show the most recent slips
    Recent {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },

    /// Write records.csv and monthly.csv
    Export {
        /// Output directory for generated CSV reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Read-only scan of a page, open slips included (nothing is saved)
    Inspect {
        /// Saved page snapshot to parse
        #[arg(short, long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Fetch this URL instead of reading a snapshot
        #[arg(long)]
        url: Option<String>,
    },

    /// Show or change stored preferences
    Prefs {
        /// Bucket monthly stats by capture time (true/false)
        #[arg(long)]
        use_capture_date: Option<bool>,
    },

    /// Delete every stored slip
    Clear {
        /// Skip the confirmation step
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = FileConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let db_path = args
        .db
        .unwrap_or_else(|| PathBuf::from(&config.storage.path));

    match args.command {
        Command::Capture { file, url, dry_run } => {
            let rows = load_rows(file, url, &config.source.url).await?;
            let store = SqliteStore::open(&db_path).await?;

            let report = if dry_run {
                // Merge against a scratch copy of the ledger; nothing is saved.
                let scratch = MemoryStore::new();
                scratch.save_all(&store.load_all().await?).await?;
                let report = capture_rows(&scratch, &rows, Utc::now()).await?;
                println!("Dry run: ledger not modified.");
                report
            } else {
                capture_rows(&store, &rows, Utc::now()).await?
            };

            print_capture_report(&report);
        }

        Command::Summary => {
            let store = SqliteStore::open(&db_path).await?;
            let records = store.load_all().await?;
            if records.is_empty() {
                println!("No slips recorded yet.");
            } else {
                print_status_summary(&status_summary(&records));
            }
        }

        Command::Monthly { by_capture_date } => {
            let store = SqliteStore::open(&db_path).await?;
            let records = store.load_all().await?;
            let prefs = store.load_prefs().await?;
            let use_capture = by_capture_date || prefs.use_capture_date;

            let months = monthly_breakdown(&records, Utc::now(), use_capture);
            if months.is_empty() {
                println!("No slips recorded yet.");
            }
            for m in &months {
                println!("\n{} ({})", m.label, m.month_key);
                println!(
                    "  {:>4} bets   bet {:>10.2}   profit {:>10.2}",
                    m.totals.count, m.totals.bet_total, m.totals.profit_total
                );
                println!(
                    "    won {} ({:.2})   lost {} ({:.2})   cancelled {} ({:.2})",
                    m.won.count,
                    m.won.profit_total,
                    m.lost.count,
                    m.lost.profit_total,
                    m.cancelled.count,
                    m.cancelled.profit_total
                );
            }
        }

        Command::Recent { count } => {
            let store = SqliteStore::open(&db_path).await?;
            let records = store.load_all().await?;
            let now = Utc::now();
            for r in recent_records(&records, count, now) {
                let date = effective_date(r, now, false);
                println!(
                    "  {}  {:<30} {:<12} {:>9.2}",
                    date.format("%Y-%m-%d %H:%M"),
                    r.game,
                    r.slip_id,
                    r.profit
                );
            }
        }

        Command::Export { output_dir } => {
            let store = SqliteStore::open(&db_path).await?;
            let records = store.load_all().await?;
            let prefs = store.load_prefs().await?;
            let output_dir =
                output_dir.unwrap_or_else(|| PathBuf::from(&config.export.output_dir));

            println!("Exporting {} slips:", records.len());
            generate_all_reports(&output_dir, &records, Utc::now(), prefs.use_capture_date)?;
        }

        Command::Inspect { file, url } => {
            let rows = load_rows(file, url, &config.source.url).await?;
            let (scanned, skipped) = scan_rows(&rows);

            println!("{} rows:", scanned.len());
            for row in &scanned {
                println!(
                    "  {:<10} {:<12} bet {:>9.2}  profit {:>9.2}  {}",
                    row.status, row.slip_id, row.bet, row.profit, row.created
                );
            }
            print_skip_stats(&skipped);
        }

        Command::Prefs { use_capture_date } => {
            let store = SqliteStore::open(&db_path).await?;
            let mut prefs = store.load_prefs().await?;
            if let Some(value) = use_capture_date {
                prefs.use_capture_date = value;
                store.save_prefs(&prefs).await?;
            }
            println!("use_capture_date = {}", prefs.use_capture_date);
        }

        Command::Clear { yes } => {
            let store = SqliteStore::open(&db_path).await?;
            let count = store.load_all().await?.len();
            if count == 0 {
                println!("Ledger is already empty.");
            } else if !yes {
                println!("This deletes all {count} stored slips. Re-run with --yes to confirm.");
            } else {
                store.clear_all().await?;
                println!("Cleared {count} slips.");
            }
        }
    }

    Ok(())
}

/// Read rows from a snapshot file, or fetch them from the configured URL.
async fn load_rows(
    file: Option<PathBuf>,
    url: Option<String>,
    default_url: &str,
) -> Result<Vec<RawRow>> {
    match file {
        Some(path) => {
            println!("Reading snapshot {}", path.display());
            source::rows_from_file(&path)
        }
        None => {
            let url = url.unwrap_or_else(|| default_url.to_string());
            println!("Fetching {url}");
            source::rows_from_url(&url).await
        }
    }
}

fn print_capture_report(report: &CaptureReport) {
    println!(
        "Recorded: {} new, {} updated. Total: {} slips",
        report.new_records, report.updated_records, report.total_records
    );
    print_skip_stats(&report.skipped);
    print_status_summary(&report.totals);
}

fn print_skip_stats(skipped: &SkipStats) {
    if skipped.is_empty() {
        return;
    }
    println!(
        "Skipped rows: {} ({} incomplete, {} unsettled, {} without slip id)",
        skipped.total(),
        skipped.missing_cells,
        skipped.unsettled_status,
        skipped.missing_slip_id
    );
}

fn print_status_summary(summary: &StatusSummary) {
    println!("\n============================================================");
    println!("                    BETTING SUMMARY");
    println!("============================================================\n");

    for (status, b) in &summary.by_status {
        println!(
            "  {:<10}  {:>5} bets   bet {:>10.2}   profit {:>10.2}",
            status, b.count, b.bet_total, b.profit_total
        );
    }
    println!("  ──────────────────────────────────────────────────────");
    let t = &summary.total;
    println!(
        "  {:<10}  {:>5} bets   bet {:>10.2}   profit {:>10.2}",
        "TOTAL", t.count, t.bet_total, t.profit_total
    );
}
