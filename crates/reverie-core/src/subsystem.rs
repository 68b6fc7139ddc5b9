//! The polymorphic subsystem contract.
//!
//! Each tick, the scheduler hands every registered subsystem a mutable
//! reference to the shared [`TickContext`] and awaits its report. All
//! subsystems use this single async contract; there is no separate
//! synchronous call path (legacy synchronous logic belongs behind an
//! adapter implementing this trait, installed at registration time).

use async_trait::async_trait;
use reverie_types::{SubsystemReport, TickContext};

/// Errors a subsystem can raise from its `tick()`.
///
/// A subsystem failure is never fatal to the tick: the scheduler logs it
/// and treats that subsystem's contribution as a no-op.
#[derive(Debug, thiserror::Error)]
pub enum SubsystemError {
    /// The subsystem's tick logic failed.
    #[error("subsystem {name} failed: {message}")]
    Failed {
        /// Name of the failing subsystem.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// The subsystem exceeded the per-tick timeout.
    #[error("subsystem {name} timed out after {timeout_ms}ms")]
    TimedOut {
        /// Name of the subsystem that timed out.
        name: String,
        /// The timeout that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
}

/// A pluggable per-tick contributor.
///
/// Subsystems execute in registration order every tick, and later
/// subsystems observe context fields written by earlier ones in the same
/// tick. The shipped ordering (pulse, schema, memory, visual) relies on
/// this: schema reads the pulse heat, and memory and visual read schema's
/// coherence and mood.
#[async_trait]
pub trait Subsystem: Send {
    /// Stable name used in reports, logs, and event payloads.
    fn name(&self) -> &str;

    /// Idempotent setup, called once before the first tick. Calling it
    /// again must be harmless.
    fn initialize(&mut self);

    /// Advance the subsystem by one tick.
    ///
    /// `delta` is the simulated time step; `ctx` is the shared per-tick
    /// context, mutated in place.
    ///
    /// # Errors
    ///
    /// Returns [`SubsystemError`] when the contribution cannot be made;
    /// the scheduler recovers by skipping it for this tick.
    async fn tick(
        &mut self,
        delta: f64,
        ctx: &mut TickContext,
    ) -> Result<SubsystemReport, SubsystemError>;

    /// Point-in-time snapshot of internal state for external readers.
    fn snapshot(&self) -> serde_json::Value;
}
