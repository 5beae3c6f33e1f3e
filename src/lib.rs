//! hotkey-edge: tick-driven hotkey edge detection
//!
//! Samples a "key down" reading once per frame for any number of
//! configured hotkeys and turns it into press, hold and release
//! callbacks, dispatched either immediately or on the next tick.
//!
//! - `hotkey`: bindings, the edge detector and per-binding listeners
//! - `scheduler`: the next-tick action queue
//! - `frame`: the loop that drives input, queue and listeners
//! - `config` / `logging`: settings file and verbosity

pub mod config;
pub mod events;
pub mod frame;
pub mod hotkey;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod scheduler;
