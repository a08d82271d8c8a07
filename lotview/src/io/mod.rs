//! Collaborators with side effects: the live tree, simulated network and
//! push stream, timers and configuration.

pub mod api;
pub mod clock;
pub mod config;
pub mod host;
pub mod stream;
pub mod task;
