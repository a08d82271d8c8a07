//! Tagged action descriptions and their creators.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::state::Lot;
use crate::core::store::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppAction {
    /// No-op dispatched once when the store is built.
    Init,
    SetTime { time: DateTime<Local> },
    SetLots { lots: Vec<Lot> },
    ChangeLotPrice { id: u64, price: f64 },
    FavoriteLot { id: u64 },
    UnfavoriteLot { id: u64 },
}

impl Action for AppAction {
    fn noop() -> Self {
        AppAction::Init
    }

    fn kind(&self) -> &'static str {
        match self {
            AppAction::Init => "INIT",
            AppAction::SetTime { .. } => "SET_TIME",
            AppAction::SetLots { .. } => "SET_LOTS",
            AppAction::ChangeLotPrice { .. } => "CHANGE_LOT_PRICE",
            AppAction::FavoriteLot { .. } => "FAVORITE_LOT",
            AppAction::UnfavoriteLot { .. } => "UNFAVORITE_LOT",
        }
    }
}

pub fn set_time(time: DateTime<Local>) -> AppAction {
    AppAction::SetTime { time }
}

pub fn set_lots(lots: Vec<Lot>) -> AppAction {
    AppAction::SetLots { lots }
}

pub fn change_lot_price(id: u64, price: f64) -> AppAction {
    AppAction::ChangeLotPrice { id, price }
}

pub fn favorite_lot(id: u64) -> AppAction {
    AppAction::FavoriteLot { id }
}

pub fn unfavorite_lot(id: u64) -> AppAction {
    AppAction::UnfavoriteLot { id }
}
