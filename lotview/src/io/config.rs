//! Application configuration stored in `lotview.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::reconcile::ReconcileOptions;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "lotview.toml";

/// Simulation and reconciler settings (TOML).
///
/// Missing fields default to the timings of the reference auction page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Delay before `GET /lots` resolves.
    pub fetch_delay_ms: u64,

    /// Delay before a favorite/unfavorite post is acknowledged.
    pub post_delay_ms: u64,

    /// Period of the clock tick that dispatches `SET_TIME`.
    pub clock_interval_ms: u64,

    /// Period of each lot's price feed.
    pub price_interval_ms: u64,

    /// JSON file with the lot list served by `GET /lots`. The bundled
    /// fixture is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lots_path: Option<PathBuf>,

    pub price: PriceConfig,

    pub reconciler: ReconcileOptions,
}

/// Simulated prices are `round(random * spread + min)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PriceConfig {
    pub min: f64,
    pub spread: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            min: 30.0,
            spread: 10.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 1000,
            post_delay_ms: 500,
            clock_interval_ms: 1000,
            price_interval_ms: 400,
            lots_path: None,
            price: PriceConfig::default(),
            reconciler: ReconcileOptions::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.clock_interval_ms == 0 {
            return Err(anyhow!("clock_interval_ms must be > 0"));
        }
        if self.price_interval_ms == 0 {
            return Err(anyhow!("price_interval_ms must be > 0"));
        }
        if !self.price.min.is_finite() || !self.price.spread.is_finite() {
            return Err(anyhow!("price.min and price.spread must be finite"));
        }
        if self.price.spread < 0.0 {
            return Err(anyhow!("price.spread must be >= 0"));
        }
        Ok(())
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }

    pub fn price_interval(&self) -> Duration {
        Duration::from_millis(self.price_interval_ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AppConfig::default()`.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let cfg = AppConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join(CONFIG_FILE);
        let cfg = AppConfig {
            price_interval_ms: 50,
            reconciler: ReconcileOptions::baseline(),
            ..AppConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "fetch_delay_ms = 5\n[reconciler]\nkeyed_children = false\n")
            .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.fetch_delay_ms, 5);
        assert!(!cfg.reconciler.keyed_children);
        assert!(cfg.reconciler.prune_attributes);
        assert_eq!(cfg.price, PriceConfig::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "clock_interval_ms = 0\n").expect("write");
        let err = load_config(&path).expect_err("invalid config");
        assert!(err.to_string().contains("clock_interval_ms"));
    }
}
