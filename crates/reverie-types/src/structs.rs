//! Core data structs for the Reverie simulation core.
//!
//! The central type here is [`TickContext`]: the mutable record handed by
//! reference to every subsystem within a single tick. Subsystems invoked
//! later in registration order observe fields written by earlier ones --
//! that ordering dependency is part of the contract, not an accident.

use serde::{Deserialize, Serialize};

use crate::enums::{Mood, PulseZone, ReportStatus, Zone};

// ---------------------------------------------------------------------------
// Pulse state
// ---------------------------------------------------------------------------

/// The pulse subsystem's contribution to the shared tick context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseState {
    /// Current thermal heat value, clamped to `[0, 1]`.
    pub heat: f64,
    /// Display bucketing of the heat value.
    pub zone: PulseZone,
}

// ---------------------------------------------------------------------------
// Tick context
// ---------------------------------------------------------------------------

/// Mutable per-tick record shared by reference across all subsystem
/// invocations within one tick.
///
/// The scheduler owns the context exclusively for the duration of a tick
/// and hands it to subsystems one at a time; it is never copied and
/// merged. The schema subsystem is the canonical writer of [`scup`] and
/// [`mood`]; the pulse subsystem is the canonical writer of [`pulse`].
///
/// [`scup`]: Self::scup
/// [`mood`]: Self::mood
/// [`pulse`]: Self::pulse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickContext {
    /// Composite coherence score, clamped to `[0, 1]`.
    ///
    /// Mid-tick this holds the schema subsystem's coherence estimate;
    /// after the scheduler's fold it holds the final computed SCUP.
    pub scup: f64,

    /// Current mood, written by the schema subsystem.
    pub mood: Mood,

    /// Pulse heat and display zone, written by the pulse subsystem.
    pub pulse: PulseState,

    /// Ids of sigils currently alive in the registry, refreshed by the
    /// scheduler after the aging pass.
    pub active_sigils: Vec<String>,
}

impl TickContext {
    /// Create a fresh context for scheduler start.
    ///
    /// SCUP begins at 0.5 (neutral coherence) so the first tick's memory
    /// formation probability and pause check behave sensibly before any
    /// subsystem has written.
    pub fn new() -> Self {
        Self {
            scup: 0.5,
            mood: Mood::Calm,
            pulse: PulseState::default(),
            active_sigils: Vec::new(),
        }
    }

    /// Write a SCUP value, clamping it to `[0, 1]`.
    pub fn set_scup(&mut self, scup: f64) {
        self.scup = scup.clamp(0.0, 1.0);
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Subsystem report
// ---------------------------------------------------------------------------

/// Status report produced by one subsystem for one tick.
///
/// Reports are consumed immediately by the scheduler and retained only in
/// the tick's [`TickSummary`]; subsystem-specific fields travel in
/// [`details`](Self::details) as free-form JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemReport {
    /// Name of the subsystem that produced the report.
    pub name: String,

    /// Whether the subsystem completed its contribution.
    pub status: ReportStatus,

    /// The subsystem's local entropy estimate for this tick, in `[0, 1]`.
    pub entropy: f64,

    /// Subsystem-specific fields (heat, mood, pattern name, ...).
    #[serde(default)]
    pub details: serde_json::Value,
}

impl SubsystemReport {
    /// Build a successful report with the given entropy contribution.
    ///
    /// Entropy is clamped to `[0, 1]` here so downstream aggregation can
    /// rely on the invariant without re-checking.
    pub fn ok(name: &str, entropy: f64) -> Self {
        Self {
            name: name.to_owned(),
            status: ReportStatus::Ok,
            entropy: entropy.clamp(0.0, 1.0),
            details: serde_json::Value::Null,
        }
    }

    /// Attach subsystem-specific detail fields to a report.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Build an error placeholder report for a failed or timed-out
    /// subsystem. The entropy contribution is zero (no-op).
    pub fn error(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: ReportStatus::Error,
            entropy: 0.0,
            details: serde_json::Value::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick summary
// ---------------------------------------------------------------------------

/// Summary of a single completed tick.
///
/// This is the payload of the `tick.completed` event and the value handed
/// to the runner's per-tick callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Final SCUP for the tick, in `[0, 1]`.
    pub scup: f64,
    /// Zone classified from the final SCUP.
    pub zone: Zone,
    /// Mood at end of tick.
    pub mood: Mood,
    /// Pulse heat at end of tick.
    pub pulse_heat: f64,
    /// Ids of sigils alive after the aging pass.
    pub active_sigils: Vec<String>,
    /// Per-subsystem reports, in registration order.
    pub reports: Vec<SubsystemReport>,
}
