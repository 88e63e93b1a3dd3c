use crate::error::{Result, StockroomError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for stockroom, stored as `config.json` in the platform config
/// directory. Missing keys take their default value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockroomConfig {
    /// Quiet time before the product view is recomputed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Delay before the sample inventory appears
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Lifetime of info and success notifications
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Products with fewer units than this are "low stock" in reports
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    /// How many sample products to load on start
    #[serde(default = "default_sample_products")]
    pub sample_products: usize,

    /// Where exports and reports are written; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_load_delay_ms() -> u64 {
    500
}

fn default_notification_ttl_ms() -> u64 {
    5000
}

fn default_low_stock_threshold() -> i64 {
    5
}

fn default_sample_products() -> usize {
    10
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            load_delay_ms: default_load_delay_ms(),
            notification_ttl_ms: default_notification_ttl_ms(),
            low_stock_threshold: default_low_stock_threshold(),
            sample_products: default_sample_products(),
            export_dir: None,
        }
    }
}

impl StockroomConfig {
    /// Platform config directory, e.g. `~/.config/stockroom` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "stockroom", "stockroom").map(|d| d.config_dir().to_path_buf())
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(config_path)
    }

    /// Load config from an explicit file. A missing file is an error here.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StockroomError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: StockroomConfig = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<PathBuf> {
        let path = config_dir.as_ref().join(CONFIG_FILENAME);
        self.save_file(&path)?;
        Ok(path)
    }

    /// Save config to an explicit file, creating its directory if needed.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
