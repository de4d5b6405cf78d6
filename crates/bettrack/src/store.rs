//! Keyed merge and persistence for the slip collection.
//!
//! The merge itself is a pure in-memory pass; persistence goes through the
//! `LedgerStore` trait, an explicit handle with load-all / save-all /
//! clear-all semantics. One logical entry holds the entire collection and
//! every save rewrites it whole, so a failed save leaves the stored state
//! untouched. Callers serialize their own capture cycles; concurrent saves
//! degrade to last-write-wins.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::types::BetRecord;

/// Storage key for the record collection.
const RECORDS_KEY: &str = "betting_records";
/// Storage key for the preference entry, independent of the collection.
const PREFS_KEY: &str = "preferences";

/// Counters from one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub new_records: usize,
    pub updated_records: usize,
}

/// Merge a batch into the collection, keyed by slip id.
///
/// An incoming slip id that already exists replaces the stored record in
/// place (same position, new field values). Unseen ids append in batch
/// order, so the collection keeps insertion order of first-seen ids.
pub fn merge_records(existing: &mut Vec<BetRecord>, incoming: Vec<BetRecord>) -> MergeOutcome {
    let mut index: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, r)| (r.slip_id.clone(), i))
        .collect();

    let mut outcome = MergeOutcome::default();
    for record in incoming {
        match index.get(&record.slip_id) {
            Some(&i) => {
                existing[i] = record;
                outcome.updated_records += 1;
            }
            None => {
                index.insert(record.slip_id.clone(), existing.len());
                existing.push(record);
                outcome.new_records += 1;
            }
        }
    }
    outcome
}

/// User preferences stored beside the collection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Bucket monthly stats by capture time instead of the slip's own date.
    #[serde(default)]
    pub use_capture_date: bool,
}

/// Persistence handle for the slip collection.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    async fn load_all(&self) -> Result<Vec<BetRecord>>;
    async fn save_all(&self, records: &[BetRecord]) -> Result<()>;
    async fn clear_all(&self) -> Result<()>;
    async fn load_prefs(&self) -> Result<Preferences>;
    async fn save_prefs(&self, prefs: &Preferences) -> Result<()>;
}

/// SQLite-backed store: one key-value table, one row for the whole
/// collection, serialized as JSON.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the backing database.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // SQLx requires the file to exist for SQLite
        if !path.exists() {
            std::fs::File::create(path)?;
        }

        let url = format!("sqlite:{}", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to open ledger database")?;

        // WAL mode and a busy timeout to avoid SQLITE_BUSY when another
        // process holds the database
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl LedgerStore for SqliteStore {
    async fn load_all(&self) -> Result<Vec<BetRecord>> {
        match self.get(RECORDS_KEY).await? {
            Some(json) => serde_json::from_str(&json).context("Corrupt record collection in store"),
            None => Ok(Vec::new()),
        }
    }

    async fn save_all(&self, records: &[BetRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.set(RECORDS_KEY, &json).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.remove(RECORDS_KEY).await
    }

    async fn load_prefs(&self) -> Result<Preferences> {
        match self.get(PREFS_KEY).await? {
            Some(json) => serde_json::from_str(&json).context("Corrupt preferences in store"),
            None => Ok(Preferences::default()),
        }
    }

    async fn save_prefs(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string(prefs)?;
        self.set(PREFS_KEY, &json).await
    }
}

/// In-process store for tests and dry-run captures.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<BetRecord>>,
    prefs: Mutex<Preferences>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<BetRecord>> {
        Ok(self.records.lock().expect("store lock poisoned").clone())
    }

    async fn save_all(&self, records: &[BetRecord]) -> Result<()> {
        *self.records.lock().expect("store lock poisoned") = records.to_vec();
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.records.lock().expect("store lock poisoned").clear();
        Ok(())
    }

    async fn load_prefs(&self) -> Result<Preferences> {
        Ok(*self.prefs.lock().expect("store lock poisoned"))
    }

    async fn save_prefs(&self, prefs: &Preferences) -> Result<()> {
        *self.prefs.lock().expect("store lock poisoned") = *prefs;
        Ok(())
    }
}
