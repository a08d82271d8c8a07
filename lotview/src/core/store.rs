//! Unidirectional state container.
//!
//! A [`Store`] owns the current state, applies a reducer on every
//! [`Store::dispatch`] and then synchronously notifies subscribers in
//! subscription order. The store is a cheap clonable handle; it is threaded
//! explicitly to whoever needs to read state or dispatch.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

/// Tagged description of an intended state transition.
pub trait Action: Debug {
    /// Action that no reducer reacts to, dispatched once at construction.
    fn noop() -> Self;
    fn kind(&self) -> &'static str;
}

/// A reducer rejected an action.
#[derive(Debug, thiserror::Error)]
pub enum ReducerError {
    #[error("reducer rejected {kind}: {reason}")]
    Rejected { kind: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Reducer(#[from] ReducerError),
    #[error("dispatch of {kind} while another dispatch is in progress")]
    Reentrant { kind: &'static str },
}

type BoxedReducer<S, A> = Box<dyn Fn(&S, &A) -> Result<S, ReducerError>>;
type Listener = Rc<dyn Fn() -> anyhow::Result<()>>;
type Listeners = RefCell<Vec<(u64, Listener)>>;

struct Inner<S, A> {
    reducer: BoxedReducer<S, A>,
    state: RefCell<Rc<S>>,
    listeners: Rc<Listeners>,
    next_listener_id: Cell<u64>,
    dispatching: Cell<bool>,
}

pub struct Store<S, A> {
    inner: Rc<Inner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: 'static, A: Action + 'static> Store<S, A> {
    /// Build a store whose initial state is `reducer(initial, A::noop())`.
    pub fn new(
        reducer: impl Fn(&S, &A) -> Result<S, ReducerError> + 'static,
        initial: S,
    ) -> Result<Self, StoreError> {
        let state = reducer(&initial, &A::noop())?;
        Ok(Self {
            inner: Rc::new(Inner {
                reducer: Box::new(reducer),
                state: RefCell::new(Rc::new(state)),
                listeners: Rc::new(RefCell::new(Vec::new())),
                next_listener_id: Cell::new(0),
                dispatching: Cell::new(false),
            }),
        })
    }

    pub fn with_default(
        reducer: impl Fn(&S, &A) -> Result<S, ReducerError> + 'static,
    ) -> Result<Self, StoreError>
    where
        S: Default,
    {
        Self::new(reducer, S::default())
    }
}

impl<S, A: Action> Store<S, A> {
    pub fn get_state(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Apply `action` and notify every subscriber.
    ///
    /// On reducer failure the state is left untouched and the error is
    /// returned. Dispatching from inside a reducer or a subscriber is
    /// rejected. A failing subscriber is logged and does not stop the rest.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        let kind = action.kind();
        if self.inner.dispatching.get() {
            error!(kind, "re-entrant dispatch rejected");
            return Err(StoreError::Reentrant { kind });
        }
        let _guard = DispatchGuard::enter(&self.inner.dispatching);

        let current = self.get_state();
        let next = (self.inner.reducer)(&current, &action)?;
        *self.inner.state.borrow_mut() = Rc::new(next);
        debug!(kind, "state updated");

        let listeners: Vec<(u64, Listener)> = self.inner.listeners.borrow().clone();
        for (id, listener) in listeners {
            if let Err(err) = listener() {
                warn!(kind, listener = id, error = %format!("{err:#}"), "subscriber failed");
            }
        }
        Ok(())
    }

    /// Register `listener`; it is called with no arguments after every dispatch.
    pub fn subscribe(&self, listener: impl Fn() -> anyhow::Result<()> + 'static) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning store handle, used by subscribers to avoid reference cycles.
pub struct WeakStore<S, A> {
    inner: Weak<Inner<S, A>>,
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, A> WeakStore<S, A> {
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

/// Disposer returned by [`Store::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Remove exactly this listener. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Combine per-slice reducers into a reducer over the whole state struct.
///
/// Each field is computed as `reducer(&state.field, action)`. Slice reducers
/// are total and return the slice type; the combined reducer never fails.
///
/// ```ignore
/// let reducer = combine_reducers!(AppState, AppAction {
///     clock: clock_reducer,
///     auction: auction_reducer,
/// });
/// ```
#[macro_export]
macro_rules! combine_reducers {
    ($state:ident, $action:ty { $($key:ident : $reducer:expr),+ $(,)? }) => {
        move |state: &$state, action: &$action| -> ::std::result::Result<$state, $crate::core::store::ReducerError> {
            Ok($state {
                $($key: ($reducer)(&state.$key, action),)+
            })
        }
    };
}
