//! Events module for hotkey edge transitions
//!
//! Provides the structured event type produced by an edge detector
//! each time a sampled key changes state or stays held.

use serde::{Deserialize, Serialize};

/// Edges emitted by a detector for one sampled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyEdge {
    /// Key went from up to down on this frame
    Press,

    /// Key went from down to up on this frame
    Release,

    /// Key stayed down since the previous frame
    Hold {
        /// Consecutive frames held since the press, starting at 1
        frames: u32,
    },
}

impl KeyEdge {
    /// Whether this edge is a transition (press or release)
    pub fn is_transition(&self) -> bool {
        !matches!(self, KeyEdge::Hold { .. })
    }
}

impl std::fmt::Display for KeyEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEdge::Press => write!(f, "KEY_PRESSED"),
            KeyEdge::Release => write!(f, "KEY_RELEASED"),
            KeyEdge::Hold { frames } => write!(f, "KEY_HELD ({} frames)", frames),
        }
    }
}
