//! Bounded simulation loop with per-tick callbacks.
//!
//! [`run_simulation`] drives the engine's tick cycle at the configured
//! wall-clock cadence until a termination condition is met: the tick
//! limit from configuration, or an external stop request via
//! [`StopHandle`]. After each tick the provided [`TickCallback`] is
//! invoked so collaborators (tick log writers, snapshot readers) can
//! observe the run without owning the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reverie_types::TickSummary;
use tracing::{info, warn};

use crate::reflect::SigilInvoker;
use crate::scheduler::{Engine, TickError};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An external stop was requested through a [`StopHandle`].
    StopRequested,
}

/// Result of a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Shared stop flag for requesting a clean simulation stop from outside
/// the tick loop (signal handlers, supervisors).
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    /// Whether a stop has been requested.
    stop_requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean stop before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to append log lines, refresh external
/// snapshots, etc. The callback receives the tick summary and a shared
/// reference to the engine for snapshot queries.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, engine: &Engine);
}

/// A no-op tick callback for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _engine: &Engine) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// Reads `max_ticks` (0 = unlimited) and `tick_interval_ms` from the
/// engine's configuration. Each cycle: check the stop handle, execute
/// one tick with `delta = 1.0`, invoke the callback, check the tick
/// limit, then sleep the configured interval.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably
/// (clock overflow is the only such case).
pub async fn run_simulation(
    engine: &mut Engine,
    invoker: &mut dyn SigilInvoker,
    stop: &StopHandle,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let max_ticks = engine.config().world.max_ticks;
    let interval_ms = engine.config().world.tick_interval_ms;

    info!(max_ticks, interval_ms, "simulation starting");

    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    loop {
        if stop.is_stop_requested() {
            info!(total_ticks, "stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::StopRequested,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = engine.advance_tick(1.0, invoker).await?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, engine);

        if max_ticks > 0 && summary.tick >= max_ticks {
            info!(tick = summary.tick, max_ticks, "tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the simulation end sequence.
///
/// Call after [`run_simulation`] returns to record the final state.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_scup = result.final_summary.as_ref().map(|s| s.scup),
        "simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            scup = summary.scup,
            zone = %summary.zone,
            mood = %summary.mood,
            "final tick summary"
        );
    } else {
        warn!("simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::reflect::RecordingInvoker;

    fn make_engine(max_ticks: u64) -> Engine {
        let mut config = EngineConfig::default();
        config.world.max_ticks = max_ticks;
        config.world.tick_interval_ms = 0; // no sleeping in tests
        Engine::with_default_subsystems(config)
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut engine = make_engine(5);
        let mut invoker = RecordingInvoker::default();
        let stop = StopHandle::new();
        let mut callback = NoOpCallback;

        let result = run_simulation(&mut engine, &mut invoker, &stop, &mut callback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut engine = make_engine(0);
        let mut invoker = RecordingInvoker::default();
        let stop = StopHandle::new();
        stop.request_stop();
        let mut callback = NoOpCallback;

        let result = run_simulation(&mut engine, &mut invoker, &stop, &mut callback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::StopRequested);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn callback_is_invoked_every_tick() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _engine: &Engine) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut engine = make_engine(3);
        let mut invoker = RecordingInvoker::default();
        let stop = StopHandle::new();
        let mut callback = CountCallback { count: 0 };

        let _ = run_simulation(&mut engine, &mut invoker, &stop, &mut callback)
            .await
            .unwrap();

        assert_eq!(callback.count, 3);
    }

    #[tokio::test]
    async fn stop_handle_is_shared_across_clones() {
        let stop = StopHandle::new();
        let other = stop.clone();
        other.request_stop();
        assert!(stop.is_stop_requested());
    }
}
