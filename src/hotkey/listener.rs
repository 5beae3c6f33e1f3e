//! Per-binding hotkey listener
//!
//! Couples a binding with its edge detector and callbacks. Once per
//! tick the frame loop asks the listener to poll the input source; the
//! listener applies the binding's modifier requirements, samples its
//! detector and dispatches whatever edge comes out.

use tracing::debug;

use crate::events::KeyEdge;
use crate::input::InputSource;
use crate::scheduler::Scheduler;

use super::binding::HotkeyBinding;
use super::detector::{Callbacks, DispatchPolicy, EdgeDetector};
use super::keys::ModifierState;

/// Listens to one hotkey binding
#[derive(Debug)]
pub struct HotkeyListener {
    name: String,
    binding: HotkeyBinding,
    detector: EdgeDetector,
    callbacks: Callbacks,
    policy: DispatchPolicy,
}

impl HotkeyListener {
    /// Create a listener with no-op callbacks and next-tick dispatch
    pub fn new(name: impl Into<String>, binding: HotkeyBinding) -> Self {
        Self {
            name: name.into(),
            binding,
            detector: EdgeDetector::new(),
            callbacks: Callbacks::default(),
            policy: DispatchPolicy::default(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &HotkeyBinding {
        &self.binding
    }

    pub fn detector(&self) -> &EdgeDetector {
        &self.detector
    }

    /// Read the binding's current state from `input`
    pub fn is_active(&self, input: &dyn InputSource) -> bool {
        let key_down = input.is_key_down(self.binding.key());
        let modifiers = ModifierState::from_query(|k| input.is_key_down(k));
        self.binding.is_active(key_down, &modifiers)
    }

    /// Poll the input once for this tick and dispatch the resulting edge
    pub fn poll(&mut self, input: &dyn InputSource, scheduler: &dyn Scheduler) -> Option<KeyEdge> {
        let pressed = self.is_active(input);
        let edge = self
            .detector
            .sample_with(pressed, &self.callbacks, self.policy, scheduler)?;

        if edge.is_transition() {
            debug!(hotkey = %self.name, binding = %self.binding, %edge, "hotkey edge");
        }
        Some(edge)
    }
}
