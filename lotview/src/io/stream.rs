//! Push stream of lot price updates.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::config::{AppConfig, PriceConfig};
use crate::io::task::TaskHandle;

/// Payload pushed on a `price-{id}` channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub id: u64,
    pub price: f64,
}

pub trait LiveStream {
    /// Start pushing updates for `channel` to `callback`.
    ///
    /// Returns `None` when the channel is not served. The caller owns the
    /// returned handle and stops the feed through it.
    fn subscribe(
        &self,
        channel: &str,
        callback: Box<dyn FnMut(PriceUpdate)>,
    ) -> Option<TaskHandle>;
}

/// Random price feed on a fixed, non-zero period. Must be used inside a `LocalSet`.
#[derive(Debug)]
pub struct SimulatedStream {
    interval: Duration,
    price: PriceConfig,
    channel: Regex,
}

impl SimulatedStream {
    pub fn new(interval: Duration, price: PriceConfig) -> Result<Self> {
        if interval.is_zero() {
            bail!("price interval must be > 0");
        }
        let channel = Regex::new(r"^price-(\d+)$").context("compile price channel pattern")?;
        Ok(Self {
            interval,
            price,
            channel,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Self::new(cfg.price_interval(), cfg.price.clone())
    }
}

impl LiveStream for SimulatedStream {
    fn subscribe(
        &self,
        channel: &str,
        mut callback: Box<dyn FnMut(PriceUpdate)>,
    ) -> Option<TaskHandle> {
        let id: u64 = match self.channel.captures(channel) {
            Some(captures) => captures[1].parse().ok()?,
            None => {
                debug!(channel, "ignoring subscription to unknown channel");
                return None;
            }
        };

        let period = self.interval;
        let price = self.price.clone();
        let join = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                callback(PriceUpdate {
                    id,
                    price: next_price(&price),
                });
            }
        });
        Some(TaskHandle::new(channel, join))
    }
}

fn next_price(price: &PriceConfig) -> f64 {
    let roll: f64 = rand::thread_rng().r#gen();
    (roll * price.spread + price.min).round()
}
