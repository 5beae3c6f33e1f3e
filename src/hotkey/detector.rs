//! Edge detector: turns a per-frame "key down" sample into press,
//! release and hold events
//!
//! A detector starts `Released` with a hold count of zero. Every call to
//! [`EdgeDetector::sample`] compares the new reading with the previous
//! one and emits at most one [`KeyEdge`]:
//!
//! - up -> down: `Press`, hold count reset to 0
//! - down -> up: `Release`, hold count reset to 0
//! - down -> down: `Hold { frames }`, hold count incremented first
//! - up -> up: nothing
//!
//! A key that is already down on the very first sample is reported as a
//! fresh press.

use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::events::KeyEdge;
use crate::scheduler::{self, Action, Scheduler};

/// The two states a tracked key can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Released,
    Pressed,
}

impl std::fmt::Display for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyState::Released => write!(f, "Released"),
            KeyState::Pressed => write!(f, "Pressed"),
        }
    }
}

/// Per-binding edge detection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    /// Reading from the previous sample
    previous_down: bool,
    /// Consecutive frames held since the last press
    hold_frames: u32,
}

impl EdgeDetector {
    /// Create a detector in the `Released` state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> KeyState {
        if self.previous_down {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames
    }

    /// Feed one frame's reading and return the resulting edge
    ///
    /// Must be called at most once per tick.
    pub fn sample(&mut self, pressed: bool) -> Option<KeyEdge> {
        let edge = if pressed != self.previous_down {
            self.hold_frames = 0;
            if pressed {
                Some(KeyEdge::Press)
            } else {
                Some(KeyEdge::Release)
            }
        } else if pressed {
            self.hold_frames = self.hold_frames.saturating_add(1);
            Some(KeyEdge::Hold {
                frames: self.hold_frames,
            })
        } else {
            None
        };

        self.previous_down = pressed;
        edge
    }

    /// Sample and route the resulting edge to `callbacks`
    ///
    /// With [`DispatchPolicy::NextTick`] the callback action goes to
    /// `scheduler` and runs on its next drain; with
    /// [`DispatchPolicy::Immediate`] the callback is called directly,
    /// without boxing, before this call returns.
    pub fn sample_with(
        &mut self,
        pressed: bool,
        callbacks: &Callbacks,
        policy: DispatchPolicy,
        scheduler: &dyn Scheduler,
    ) -> Option<KeyEdge> {
        let edge = self.sample(pressed)?;
        match policy {
            DispatchPolicy::Immediate => callbacks.invoke(edge),
            DispatchPolicy::NextTick => scheduler.run_on_next_tick(callbacks.action_for(edge)),
        }
        Some(edge)
    }
}

/// When a callback's action runs relative to the sample that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Run inside the sampling call
    Immediate,
    /// Run once on the scheduler's next tick
    #[default]
    NextTick,
}

/// Callback for press and release edges
pub type KeyPressFn = Rc<dyn Fn()>;

/// Callback for hold edges: given the frame count, yields the action to run
pub type KeyHoldFn = Rc<dyn Fn(u32) -> Action>;

/// The callbacks a detector dispatches to. Every field defaults to a no-op.
#[derive(Clone)]
pub struct Callbacks {
    pub on_press: KeyPressFn,
    pub on_release: KeyPressFn,
    pub on_hold: KeyHoldFn,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            on_press: Rc::new(|| {}),
            on_release: Rc::new(|| {}),
            on_hold: Rc::new(|_| scheduler::noop()),
        }
    }
}

impl Callbacks {
    /// Callbacks that only react to presses
    pub fn on_press(f: impl Fn() + 'static) -> Self {
        Self {
            on_press: Rc::new(f),
            ..Self::default()
        }
    }

    /// Replace the release callback
    pub fn with_release(mut self, f: impl Fn() + 'static) -> Self {
        self.on_release = Rc::new(f);
        self
    }

    /// Replace the hold callback
    pub fn with_hold(mut self, f: impl Fn(u32) -> Action + 'static) -> Self {
        self.on_hold = Rc::new(f);
        self
    }

    /// Callbacks that log each edge for the named hotkey
    pub fn logging(name: impl Into<String>) -> Self {
        let name: Rc<str> = Rc::from(name.into());
        let press = Rc::clone(&name);
        let release = Rc::clone(&name);
        Self {
            on_press: Rc::new(move || info!(hotkey = %press, "key was pressed")),
            on_release: Rc::new(move || debug!(hotkey = %release, "key was released")),
            on_hold: Rc::new(move |frames| -> Action {
                let name = Rc::clone(&name);
                Box::new(move || {
                    debug!(hotkey = %name, frames, "key has been held");
                })
            }),
        }
    }

    /// Run the callback for `edge` right away
    pub fn invoke(&self, edge: KeyEdge) {
        match edge {
            KeyEdge::Press => (self.on_press)(),
            KeyEdge::Release => (self.on_release)(),
            KeyEdge::Hold { frames } => (self.on_hold)(frames)(),
        }
    }

    /// Build the zero-argument action for `edge`
    pub fn action_for(&self, edge: KeyEdge) -> Action {
        trace!(%edge, "dispatching edge");
        match edge {
            KeyEdge::Press => {
                let f = Rc::clone(&self.on_press);
                Box::new(move || f())
            }
            KeyEdge::Release => {
                let f = Rc::clone(&self.on_release);
                Box::new(move || f())
            }
            KeyEdge::Hold { frames } => (self.on_hold)(frames),
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}
