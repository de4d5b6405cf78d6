//! Core record types for the betting ledger.

use serde::{Deserialize, Serialize};

/// Outcome of a settled slip. Canonical text form is lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Won,
    Lost,
    Cancelled,
}

impl BetStatus {
    /// Parse trimmed, lower-cased status text from a history row.
    /// Anything outside the settled set (e.g. `open`) is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One settled wagering event scraped from the history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    /// Match label, may be empty.
    pub game: String,
    /// Slip id, the natural key used for deduplication.
    pub slip_id: String,
    /// Stake, rounded to 2 decimals.
    pub bet: f64,
    /// Net profit, rounded to 2 decimals. Negative for losses.
    pub profit: f64,
    pub status: BetStatus,
    /// Raw date text as the site rendered it. Untrusted format.
    pub created: String,
    /// RFC 3339 capture timestamp, assigned at extraction time.
    pub recorded_at: String,
}

/// Round to 2 fractional digits. Applied per stored value and per
/// aggregation bucket.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
