//! Cooperative frame loop
//!
//! One tick does three things in order: advance the input source, run
//! the actions scheduled on the previous tick, then poll every listener
//! in registration order. Actions scheduled by this tick's polls run at
//! the start of the next one.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::events::KeyEdge;
use crate::hotkey::HotkeyListener;
use crate::input::InputSource;
use crate::logging::OPTIMIZATION_TARGET;
use crate::scheduler::TickQueue;

/// Why [`FrameLoop::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The input source ran out of frames
    InputExhausted,
    /// The configured tick limit was reached
    TickLimit,
}

/// Drives listeners once per tick
pub struct FrameLoop<I> {
    input: I,
    queue: Rc<TickQueue>,
    listeners: Vec<HotkeyListener>,
    tick: u64,
}

impl<I: InputSource> FrameLoop<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            queue: Rc::new(TickQueue::new()),
            listeners: Vec::new(),
            tick: 0,
        }
    }

    /// Add a listener; listeners are polled in the order they were added
    pub fn add_listener(&mut self, listener: HotkeyListener) {
        debug!(hotkey = listener.name(), binding = %listener.binding(), "listening");
        self.listeners.push(listener);
    }

    pub fn listeners(&self) -> &[HotkeyListener] {
        &self.listeners
    }

    /// The queue drained at the start of each tick
    pub fn queue(&self) -> Rc<TickQueue> {
        Rc::clone(&self.queue)
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Run one tick, returning the edges produced by each listener
    pub fn step(&mut self) -> Vec<(usize, KeyEdge)> {
        let started = Instant::now();
        self.tick += 1;
        self.input.begin_frame();

        let ran = self.queue.run_pending();

        let mut edges = Vec::new();
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if let Some(edge) = listener.poll(&self.input, self.queue.as_ref()) {
                edges.push((index, edge));
            }
        }

        trace!(
            target: OPTIMIZATION_TARGET,
            tick = self.tick,
            ran,
            edges = edges.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "tick"
        );
        edges
    }

    /// Tick every `period` until the input is exhausted or `max_ticks`
    /// ticks have run
    ///
    /// Actions still pending when the input runs out get one final drain.
    pub async fn run(&mut self, period: Duration, max_ticks: Option<u64>) -> StopReason {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            period_ms = period.as_millis() as u64,
            listeners = self.listeners.len(),
            "frame loop started"
        );

        let reason = loop {
            if max_ticks.is_some_and(|max| self.tick >= max) {
                break StopReason::TickLimit;
            }
            if self.input.is_exhausted() {
                break StopReason::InputExhausted;
            }
            ticker.tick().await;
            self.step();
        };

        if reason == StopReason::InputExhausted {
            let ran = self.queue.run_pending();
            debug!(ran, "final drain");
        }

        info!(ticks = self.tick, ?reason, "frame loop stopped");
        reason
    }
}
