//! Next-tick action scheduling
//!
//! Hotkey callbacks are not run inside the sampling call by default.
//! They are queued here and executed exactly once when the frame loop
//! drains the queue on the following tick.

mod queue;

pub use queue::TickQueue;

/// A one-shot action run by the scheduler
pub type Action = Box<dyn FnOnce()>;

/// Runs an action exactly once on the next tick
pub trait Scheduler {
    /// Queue `action` for the next drain. There is no way to retract it.
    fn run_on_next_tick(&self, action: Action);
}

/// An action that does nothing
pub fn noop() -> Action {
    Box::new(|| {})
}
