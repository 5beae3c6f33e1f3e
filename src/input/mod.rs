//! Raw input sources polled by the frame loop

mod scripted;

pub use scripted::{InputError, ScriptedInput};

use crate::hotkey::KeyCode;

/// Answers "is this physical key down" for the current frame
pub trait InputSource {
    /// Whether `code` is down on the current frame
    fn is_key_down(&self, code: KeyCode) -> bool;

    /// Advance to the next frame. Called once at the start of every tick.
    fn begin_frame(&mut self) {}

    /// Whether the source has no more frames to offer
    fn is_exhausted(&self) -> bool {
        false
    }
}
