//! Test-only helpers for building lots and state slices.

use std::rc::Rc;

use crate::core::state::{AppState, AuctionState, Lot};

/// Create a deterministic lot that is not a favorite.
pub fn lot(id: u64, price: f64) -> Lot {
    Lot {
        id,
        name: format!("Lot {}", id),
        description: format!("Lot {} description", id),
        price,
        favorite: false,
    }
}

/// Create a lot with explicit `favorite`.
pub fn favorite_lot(id: u64, price: f64, favorite: bool) -> Lot {
    Lot {
        favorite,
        ..lot(id, price)
    }
}

/// Auction slice holding `lots` in order.
pub fn auction_with(lots: Vec<Lot>) -> Rc<AuctionState> {
    Rc::new(AuctionState {
        lots: Some(lots.into_iter().map(Rc::new).collect()),
    })
}

/// Root state with the given lots and a default clock.
pub fn state_with(lots: Vec<Lot>) -> AppState {
    AppState {
        auction: auction_with(lots),
        ..AppState::default()
    }
}
