//! Request/response data source for lots.
//!
//! The [`DataSource`] trait decouples the page from the backend. The only
//! implementation is [`SimulatedApi`], which answers a fixed set of routes
//! after a configurable delay.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::state::Lot;
use crate::io::config::AppConfig;

const BUNDLED_LOTS: &str = include_str!("../../fixtures/lots.json");

/// Request path not served by the data source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("unknown address {0}")]
    UnknownAddress(String),
}

/// Empty acknowledgement of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {}

#[allow(async_fn_in_trait)]
pub trait DataSource {
    /// Fetch the ordered lot list served at `path`.
    async fn get(&self, path: &str) -> Result<Vec<Lot>, RouteError>;
    async fn post(&self, path: &str) -> Result<Ack, RouteError>;
}

#[derive(Debug)]
pub struct SimulatedApi {
    lots: Vec<Lot>,
    fetch_delay: Duration,
    post_delay: Duration,
    toggle_route: Regex,
}

impl SimulatedApi {
    pub fn new(lots: Vec<Lot>, fetch_delay: Duration, post_delay: Duration) -> Result<Self> {
        let toggle_route =
            Regex::new(r"^/lots/(\d+)/(favorite|unfavorite)$").context("compile toggle route")?;
        Ok(Self {
            lots,
            fetch_delay,
            post_delay,
            toggle_route,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let lots = match &cfg.lots_path {
            Some(path) => load_lots_file(path)?,
            None => bundled_lots()?,
        };
        Self::new(lots, cfg.fetch_delay(), cfg.post_delay())
    }
}

impl DataSource for SimulatedApi {
    async fn get(&self, path: &str) -> Result<Vec<Lot>, RouteError> {
        if path != "/lots" {
            return Err(RouteError::UnknownAddress(path.to_string()));
        }
        tokio::time::sleep(self.fetch_delay).await;
        debug!(count = self.lots.len(), "served lot list");
        Ok(self.lots.clone())
    }

    async fn post(&self, path: &str) -> Result<Ack, RouteError> {
        let Some(captures) = self.toggle_route.captures(path) else {
            return Err(RouteError::UnknownAddress(path.to_string()));
        };
        tokio::time::sleep(self.post_delay).await;
        debug!(lot = &captures[1], action = &captures[2], "acknowledged post");
        Ok(Ack {})
    }
}

/// Lot list shipped with the crate.
pub fn bundled_lots() -> Result<Vec<Lot>> {
    serde_json::from_str(BUNDLED_LOTS).context("parse bundled lots fixture")
}

pub fn load_lots_file(path: &Path) -> Result<Vec<Lot>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read lots {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse lots {}", path.display()))
}
