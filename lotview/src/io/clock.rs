//! Recurring clock tick.

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Local;
use tracing::warn;

use crate::core::actions::{AppAction, set_time};
use crate::core::state::AppState;
use crate::core::store::Store;
use crate::io::task::TaskHandle;

/// Dispatch `SET_TIME` with the current local time every `period`.
///
/// The task holds only a weak store handle and ends once the store is gone.
/// Must be called inside a `LocalSet`. A zero `period` is rejected.
pub fn start_clock(store: &Store<AppState, AppAction>, period: Duration) -> Result<TaskHandle> {
    if period.is_zero() {
        bail!("clock period must be > 0");
    }
    let store = store.downgrade();
    let join = tokio::task::spawn_local(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            if let Err(err) = store.dispatch(set_time(Local::now())) {
                warn!(error = %err, "clock tick dispatch failed");
            }
        }
    });
    Ok(TaskHandle::new("clock", join))
}
