//! Deterministic, pure logic: tree description, evaluation, reconciliation
//! and the state pipeline.
//!
//! Core modules must be free of I/O side effects. The only mutable structure
//! they touch is the live tree handed to the reconciler through [`reconcile::HostTree`].

pub mod actions;
pub mod builder;
pub mod evaluate;
pub mod invariants;
pub mod node;
pub mod reconcile;
pub mod reducers;
pub mod state;
pub mod store;
