//! Application state slices.
//!
//! Slices are shared through `Rc` so that a reducer which does not react to an
//! action can hand back the very same allocation. Callers rely on
//! `Rc::ptr_eq` to detect unchanged slices and records cheaply.

use std::rc::Rc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single auction lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockState {
    pub time: DateTime<Local>,
}

impl Default for ClockState {
    fn default() -> Self {
        Self { time: Local::now() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuctionState {
    /// `None` until the first load completes.
    pub lots: Option<Vec<Rc<Lot>>>,
}

/// Root state combining every slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub clock: Rc<ClockState>,
    pub auction: Rc<AuctionState>,
}
