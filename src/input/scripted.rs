//! Replays recorded input, one entry per frame
//!
//! A replay file is a JSON array of frames, each frame listing the keys
//! held on that frame by name or scan code:
//!
//! ```json
//! [[], ["F5"], ["F5", "LeftShift"], [63], []]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use super::InputSource;
use crate::hotkey::KeyCode;

/// Errors loading a replay
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid replay: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Input source backed by a fixed list of frames
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<BTreeSet<KeyCode>>,
    /// Index of the current frame; `None` before the first tick
    cursor: Option<usize>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<BTreeSet<KeyCode>>) -> Self {
        Self {
            frames,
            cursor: None,
        }
    }

    /// Parse a replay from JSON text
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        let frames: Vec<BTreeSet<KeyCode>> = serde_json::from_str(json)?;
        debug!(frames = frames.len(), "replay parsed");
        Ok(Self::new(frames))
    }

    /// Load a replay from a file
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        let input = Self::from_json(&text)?;
        info!(?path, frames = input.len(), "replay loaded");
        Ok(input)
    }

    /// Total number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn current(&self) -> Option<&BTreeSet<KeyCode>> {
        self.cursor.and_then(|i| self.frames.get(i))
    }
}

impl InputSource for ScriptedInput {
    fn is_key_down(&self, code: KeyCode) -> bool {
        self.current().is_some_and(|keys| keys.contains(&code))
    }

    fn begin_frame(&mut self) {
        self.cursor = Some(self.cursor.map_or(0, |i| i.saturating_add(1)));
    }

    fn is_exhausted(&self) -> bool {
        // The last frame counts as consumed once it has been sampled
        match self.cursor {
            None => self.frames.is_empty(),
            Some(i) => i + 1 >= self.frames.len(),
        }
    }
}
