//! Status and monthly aggregation over the stored collection.
//!
//! Every bucket accumulates raw sums and is rounded to 2 decimals once, at
//! the end; grand totals then sum the already-rounded bucket values. The
//! resulting third-decimal drift versus a raw sum is part of the contract.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::dates;
use crate::types::{BetRecord, BetStatus, round2};

/// Partial sums for one aggregation group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub bet_total: f64,
    pub profit_total: f64,
    pub count: u64,
}

impl Bucket {
    fn add(&mut self, bet: f64, profit: f64) {
        self.bet_total += bet;
        self.profit_total += profit;
        self.count += 1;
    }

    fn round(&mut self) {
        self.bet_total = round2(self.bet_total);
        self.profit_total = round2(self.profit_total);
    }
}

/// Status-partitioned totals. Buckets appear in first-seen order; `total`
/// always exists and sums the already-rounded buckets.
#[derive(Debug, Clone, Default)]
pub struct StatusSummary {
    pub by_status: Vec<(String, Bucket)>,
    pub total: Bucket,
}

impl StatusSummary {
    pub fn get(&self, status: &str) -> Option<&Bucket> {
        self.by_status
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, b)| b)
    }

    fn bucket_mut(&mut self, status: &str) -> &mut Bucket {
        if let Some(i) = self.by_status.iter().position(|(s, _)| s == status) {
            return &mut self.by_status[i].1;
        }
        self.by_status.push((status.to_string(), Bucket::default()));
        &mut self.by_status.last_mut().expect("just pushed").1
    }
}

/// Group the collection by status, lazily creating a bucket per status seen.
pub fn status_summary(records: &[BetRecord]) -> StatusSummary {
    let mut summary = StatusSummary::default();

    for r in records {
        summary.bucket_mut(r.status.as_str()).add(r.bet, r.profit);
    }

    for (_, bucket) in &mut summary.by_status {
        bucket.round();
    }
    for (_, bucket) in &summary.by_status {
        summary.total.bet_total += bucket.bet_total;
        summary.total.profit_total += bucket.profit_total;
        summary.total.count += bucket.count;
    }
    summary.total.round();

    summary
}

/// One calendar month of activity.
#[derive(Debug, Clone)]
pub struct MonthBucket {
    /// `YYYY-MM` sort key.
    pub month_key: String,
    /// Human label, e.g. "September 2025".
    pub label: String,
    pub totals: Bucket,
    pub won: Bucket,
    pub lost: Bucket,
    pub cancelled: Bucket,
}

impl MonthBucket {
    fn new(month_key: String, label: String) -> Self {
        Self {
            month_key,
            label,
            totals: Bucket::default(),
            won: Bucket::default(),
            lost: Bucket::default(),
            cancelled: Bucket::default(),
        }
    }
}

/// The date a record is bucketed under: the slip's own date when it resolves
/// to something plausible, otherwise the capture timestamp.
pub fn effective_date(record: &BetRecord, now: DateTime<Utc>, use_capture_date: bool) -> DateTime<Utc> {
    let recorded = dates::parse_recorded_at(&record.recorded_at, now);
    if use_capture_date || record.created.trim().is_empty() {
        return recorded;
    }
    match dates::try_resolve(&record.created, now) {
        Some(d) if d.year() >= 2020 => d,
        _ => recorded,
    }
}

/// Month-partitioned breakdown, newest month first.
pub fn monthly_breakdown(
    records: &[BetRecord],
    now: DateTime<Utc>,
    use_capture_date: bool,
) -> Vec<MonthBucket> {
    let mut months: HashMap<String, MonthBucket> = HashMap::new();

    for r in records {
        let date = effective_date(r, now, use_capture_date);
        let key = format!("{:04}-{:02}", date.year(), date.month());
        let entry = months
            .entry(key.clone())
            .or_insert_with(|| MonthBucket::new(key, date.format("%B %Y").to_string()));

        entry.totals.add(r.bet, r.profit);
        let sub = match r.status {
            BetStatus::Won => &mut entry.won,
            BetStatus::Lost => &mut entry.lost,
            BetStatus::Cancelled => &mut entry.cancelled,
        };
        sub.add(r.bet, r.profit);
    }

    let mut out: Vec<MonthBucket> = months.into_values().collect();
    for m in &mut out {
        m.totals.round();
        m.won.round();
        m.lost.round();
        m.cancelled.round();
    }
    out.sort_by(|a, b| b.month_key.cmp(&a.month_key));
    out
}

/// The latest slips by effective date, newest first.
pub fn recent_records<'a>(
    records: &'a [BetRecord],
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<&'a BetRecord> {
    let mut sorted: Vec<&BetRecord> = records.iter().collect();
    sorted.sort_by_key(|r| std::cmp::Reverse(effective_date(r, now, false)));
    sorted.truncate(limit);
    sorted
}
