//! Configuration loaded from `config.toml`. Every field is optional; the
//! file itself may be absent. CLI flags override whatever is configured.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default location of the betting-history page.
pub const DEFAULT_HISTORY_URL: &str = "https://csgoempire.com/profile/match-betting/history";
/// Default ledger database path.
pub const DEFAULT_DB_PATH: &str = "./data/bets.sqlite";
/// Default CSV output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Configuration loaded from config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Where to scrape from when no snapshot file is given.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
}

/// Where the ledger database lives.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Where CSV exports are written.
#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_url() -> String {
    DEFAULT_HISTORY_URL.to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file, or defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            "Failed to parse config.toml. Check for invalid TOML syntax \
             or incorrect data types (strings vs numbers)."
        })
    }
}
