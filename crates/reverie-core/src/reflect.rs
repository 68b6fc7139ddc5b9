//! The reflective pause/cooldown loop.
//!
//! Every tick the loop receives the final SCUP value. When coherence
//! collapses below the pause threshold, reflection shuts down for a
//! cooldown window: no now-state recording, no sigil execution. The loop
//! re-checks each tick and resumes automatically once the window ends.
//!
//! Sigil execution is abstracted behind [`SigilInvoker`] so the engine
//! can wire a logging invoker while tests inject a recording one.

use std::collections::VecDeque;

use reverie_sigils::{Sigil, SigilPriority, SigilRegistry};
use reverie_types::{Mood, Zone};
use tracing::{debug, info};

/// Capacity of the now-state history.
const HISTORY_CAPACITY: usize = 10;

/// Reflective loop execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Reflection runs normally.
    Active,
    /// Reflection is skipped until the cooldown window ends.
    Paused,
}

/// Executes an active sigil on behalf of the reflective loop.
pub trait SigilInvoker: Send {
    /// Invoke one sigil at the given tick.
    fn invoke(&mut self, sigil: &Sigil, tick: u64);
}

/// Invoker that only logs invocations (the engine default).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInvoker;

impl SigilInvoker for LoggingInvoker {
    fn invoke(&mut self, sigil: &Sigil, tick: u64) {
        debug!(id = %sigil.id, heat = sigil.heat, tick, "sigil invoked");
    }
}

/// Invoker that records every invocation (test double).
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    /// `(tick, sigil id)` pairs in invocation order.
    pub invocations: Vec<(u64, String)>,
}

impl SigilInvoker for RecordingInvoker {
    fn invoke(&mut self, sigil: &Sigil, tick: u64) {
        self.invocations.push((tick, sigil.id.clone()));
    }
}

/// The pause/cooldown state machine gating reflection and sigil
/// execution.
#[derive(Debug)]
pub struct ReflectiveLoop {
    /// Current execution state.
    state: LoopState,

    /// First tick at which a paused loop may resume.
    pause_until: u64,

    /// SCUP below which the loop pauses.
    pause_threshold: f64,

    /// Length of the cooldown window in ticks.
    cooldown_ticks: u64,

    /// Bounded FIFO of now-state sentences, newest last.
    history: VecDeque<String>,

    /// Number of pauses triggered over the loop's lifetime.
    pauses_triggered: u64,
}

impl ReflectiveLoop {
    /// Create an active loop with the given pause threshold and cooldown
    /// window.
    pub const fn new(pause_threshold: f64, cooldown_ticks: u64) -> Self {
        Self {
            state: LoopState::Active,
            pause_until: 0,
            pause_threshold,
            cooldown_ticks,
            history: VecDeque::new(),
            pauses_triggered: 0,
        }
    }

    /// Current execution state.
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Whether the loop is currently paused.
    pub fn is_paused(&self) -> bool {
        self.state == LoopState::Paused
    }

    /// First tick at which a paused loop may resume.
    pub const fn pause_until(&self) -> u64 {
        self.pause_until
    }

    /// Number of pauses triggered so far.
    pub const fn pauses_triggered(&self) -> u64 {
        self.pauses_triggered
    }

    /// Copy of the now-state history, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }

    /// Run one reflective step for the tick.
    ///
    /// Returns `true` if reflection ran (now-state recorded, sigils
    /// invoked), `false` if the tick was skipped because the loop is --
    /// or just became -- paused.
    pub fn run_tick(
        &mut self,
        tick: u64,
        scup: f64,
        zone: Zone,
        mood: Mood,
        registry: &SigilRegistry,
        invoker: &mut dyn SigilInvoker,
    ) -> bool {
        if self.state == LoopState::Paused {
            if tick < self.pause_until {
                debug!(tick, pause_until = self.pause_until, "reflection paused, skipping");
                return false;
            }
            self.state = LoopState::Active;
            info!(tick, "reflection resumed");
        }

        if scup < self.pause_threshold {
            self.state = LoopState::Paused;
            self.pause_until = tick.saturating_add(self.cooldown_ticks);
            self.pauses_triggered = self.pauses_triggered.saturating_add(1);
            info!(
                tick,
                scup,
                pause_until = self.pause_until,
                "coherence collapsed, pausing reflection"
            );
            return false;
        }

        self.record_now_state(tick, scup, zone, mood);

        for sigil in registry.active_sigils() {
            if sigil.priority == SigilPriority::Persistent {
                info!(id = %sigil.id, tick, "invoking persistent sigil");
            }
            invoker.invoke(&sigil, tick);
        }

        true
    }

    /// Append the now-state sentence, trimming the history to capacity.
    fn record_now_state(&mut self, tick: u64, scup: f64, zone: Zone, mood: Mood) {
        self.history
            .push_back(format!("tick {tick}: scup {scup:.3}, {zone} zone, {mood} mood"));
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }
}
