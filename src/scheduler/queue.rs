//! Single-threaded queue of pending next-tick actions

use std::cell::{Cell, RefCell};

use tracing::trace;

use super::{Action, Scheduler};

/// Pending actions waiting for the next tick
///
/// Actions scheduled while [`TickQueue::run_pending`] is executing are
/// kept for the following drain, so an action never runs on the tick
/// that scheduled it.
#[derive(Default)]
pub struct TickQueue {
    pending: RefCell<Vec<Action>>,
    executed: Cell<u64>,
}

impl TickQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions waiting for the next drain
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether no action is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Total number of actions run since creation
    pub fn executed(&self) -> u64 {
        self.executed.get()
    }

    /// Run every action queued before this call, in scheduling order
    ///
    /// Returns how many actions were run.
    pub fn run_pending(&self) -> usize {
        // Take the batch first; actions may schedule more work.
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let count = batch.len();

        for action in batch {
            action();
        }

        if count > 0 {
            self.executed.set(self.executed.get() + count as u64);
            trace!(count, "ran pending actions");
        }

        count
    }
}

impl Scheduler for TickQueue {
    fn run_on_next_tick(&self, action: Action) {
        self.pending.borrow_mut().push(action);
    }
}

impl std::fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.len())
            .field("executed", &self.executed.get())
            .finish()
    }
}
