use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierStrategy;
use crate::error::{LedgerError, Result};

pub const DB_FILE: &str = "society.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub society_name: String,
    /// Month (01-12) the society's financial year starts in.
    #[serde(default = "default_fiscal_year_start")]
    pub fiscal_year_start: String,
    #[serde(default)]
    pub classifier: ClassifierStrategy,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "default_session_minutes")]
    pub session_minutes: i64,
}

fn default_fiscal_year_start() -> String {
    "04".to_string()
}

fn default_session_minutes() -> i64 {
    15
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            society_name: String::new(),
            fiscal_year_start: default_fiscal_year_start(),
            classifier: ClassifierStrategy::default(),
            password_hash: None,
            session_minutes: default_session_minutes(),
        }
    }
}

impl Settings {
    /// Fiscal year start as a month number; falls back to April when the
    /// stored value is not a valid month.
    pub fn fiscal_start_month(&self) -> u32 {
        match self.fiscal_year_start.trim().parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => m,
            _ => 4,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("society-ledger")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("society-ledger")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
