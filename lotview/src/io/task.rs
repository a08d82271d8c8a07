//! Ownership handle for recurring background work.

use tokio::task::JoinHandle;

/// Handle to a task spawned on the local set (clock tick, price feed).
///
/// Whoever starts the task owns the handle. `stop` aborts the task; dropping
/// the handle stops it too.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn new(name: impl Into<String>, join: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            join,
        }
    }

    pub fn stop(&self) {
        if !self.join.is_finished() {
            tracing::debug!(task = %self.name, "stopping task");
        }
        self.join.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}
