//! Pure state transitions for each slice.
//!
//! Every reducer is total: an action it does not handle returns the input
//! slice itself, so unchanged slices stay `Rc::ptr_eq` to their predecessor.

use std::rc::Rc;

use crate::core::actions::AppAction;
use crate::core::state::{AppState, AuctionState, ClockState, Lot};
use crate::core::store::ReducerError;

pub fn clock_reducer(state: &Rc<ClockState>, action: &AppAction) -> Rc<ClockState> {
    match action {
        AppAction::SetTime { time } => Rc::new(ClockState { time: *time }),
        _ => Rc::clone(state),
    }
}

pub fn auction_reducer(state: &Rc<AuctionState>, action: &AppAction) -> Rc<AuctionState> {
    match action {
        AppAction::SetLots { lots } => Rc::new(AuctionState {
            lots: Some(lots.iter().cloned().map(Rc::new).collect()),
        }),
        AppAction::ChangeLotPrice { id, price } => update_lot(state, *id, |lot| lot.price = *price),
        AppAction::FavoriteLot { id } => update_lot(state, *id, |lot| lot.favorite = true),
        AppAction::UnfavoriteLot { id } => update_lot(state, *id, |lot| lot.favorite = false),
        _ => Rc::clone(state),
    }
}

/// Replace the record whose id matches with an edited copy.
///
/// Other records are shared with the previous list. Before the first load, or
/// when no record matches, the slice is returned unchanged.
fn update_lot(state: &Rc<AuctionState>, id: u64, edit: impl Fn(&mut Lot)) -> Rc<AuctionState> {
    let Some(lots) = &state.lots else {
        return Rc::clone(state);
    };
    if !lots.iter().any(|lot| lot.id == id) {
        return Rc::clone(state);
    }

    let lots = lots
        .iter()
        .map(|lot| {
            if lot.id != id {
                return Rc::clone(lot);
            }
            let mut updated = Lot::clone(lot);
            edit(&mut updated);
            Rc::new(updated)
        })
        .collect();
    Rc::new(AuctionState { lots: Some(lots) })
}

/// Reducer over the whole [`AppState`].
pub fn app_reducer() -> impl Fn(&AppState, &AppAction) -> Result<AppState, ReducerError> {
    crate::combine_reducers!(AppState, AppAction {
        clock: clock_reducer,
        auction: auction_reducer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::{
        change_lot_price, favorite_lot, set_lots, set_time, unfavorite_lot,
    };
    use crate::test_support::{auction_with, lot};
    use chrono::{Local, TimeZone};

    #[test]
    fn price_change_replaces_only_matching_record() {
        let state = auction_with(vec![lot(1, 16.0), lot(2, 21.0)]);
        let next = auction_reducer(&state, &change_lot_price(1, 20.0));

        let before = state.lots.as_ref().expect("lots");
        let after = next.lots.as_ref().expect("lots");
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].price, 20.0);
        assert_eq!(after[1].price, 21.0);
        assert!(Rc::ptr_eq(&before[1], &after[1]));
        assert_eq!(before[0].price, 16.0);
    }

    #[test]
    fn favorite_twice_equals_once() {
        let state = auction_with(vec![lot(1, 16.0), lot(2, 21.0)]);
        let once = auction_reducer(&state, &favorite_lot(2));
        let twice = auction_reducer(&once, &favorite_lot(2));
        assert_eq!(once, twice);
        assert!(twice.lots.as_ref().expect("lots")[1].favorite);

        let cleared = auction_reducer(&twice, &unfavorite_lot(2));
        assert!(!cleared.lots.as_ref().expect("lots")[1].favorite);
    }

    #[test]
    fn list_mutations_before_load_are_identity() {
        let empty = Rc::new(AuctionState::default());
        for action in [change_lot_price(1, 5.0), favorite_lot(1), unfavorite_lot(1)] {
            assert!(Rc::ptr_eq(&empty, &auction_reducer(&empty, &action)));
        }
    }

    #[test]
    fn unknown_lot_id_leaves_slice_untouched() {
        let state = auction_with(vec![lot(1, 16.0)]);
        assert!(Rc::ptr_eq(&state, &auction_reducer(&state, &favorite_lot(99))));
    }

    #[test]
    fn unrelated_actions_return_same_slices() {
        let reducer = app_reducer();
        let state = AppState::default();
        let time = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("time");

        let after_clock = reducer(&state, &set_time(time)).expect("reduce");
        assert!(Rc::ptr_eq(&state.auction, &after_clock.auction));
        assert_eq!(after_clock.clock.time, time);

        let after_lots = reducer(&after_clock, &set_lots(vec![lot(1, 1.0)])).expect("reduce");
        assert!(Rc::ptr_eq(&after_clock.clock, &after_lots.clock));
        assert_eq!(after_lots.auction.lots.as_ref().map(Vec::len), Some(1));
    }
}
