//! Live auction page driven by a single store and a reconciling renderer.
//!
//! The crate keeps the same split throughout:
//!
//! - **[`core`]**: Pure logic. The store, reducers, declarative nodes, the
//!   evaluator and the reconciler. No timers, I/O or randomness; the only
//!   clock read is the default time of a freshly built state.
//! - **[`io`]**: Side effects. The in-memory live tree, the simulated data
//!   source and price stream, the clock task and configuration files.
//!
//! [`view`] describes the page, [`driver`] re-renders it on every state
//! change and [`app`] wires everything together for the CLI.

pub mod app;
pub mod core;
pub mod driver;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod view;
