//! Hotkey module for tick-driven key edge detection
//!
//! Bindings describe which key and modifiers to watch, the detector
//! turns per-frame readings into press/hold/release edges, and the
//! listener ties both to an input source and a callback record.

mod binding;
mod detector;
mod keys;
mod listener;

pub use binding::{BindingError, HotkeyBinding, InverseModifier, ModifierRequirement, Modifiers};
pub use detector::{Callbacks, DispatchPolicy, EdgeDetector, KeyHoldFn, KeyPressFn, KeyState};
pub use keys::{codes, KeyCode, ModifierState, UnknownKey};
pub use listener::HotkeyListener;
