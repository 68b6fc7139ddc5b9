//! The one-tick orchestration engine.
//!
//! Each call to [`Engine::advance_tick`] runs one complete cycle:
//!
//! 1. **Advance** -- the clock increments (checked; overflow is the only
//!    hard error).
//! 2. **Subsystems** -- every registered subsystem runs in registration
//!    order against the shared [`TickContext`], each under a bounded
//!    timeout. A failure or timeout is logged and skipped; the tick never
//!    aborts because of a single subsystem (fail-soft).
//! 3. **Sigils** -- the registry ages, decays, expires, and cold-purges
//!    its sigils in one pass; the context's active-sigil list is
//!    refreshed.
//! 4. **Fold** -- the final SCUP is computed from the pulse pressure,
//!    baseline urgency, sigil drift entropy, the schema subsystem's
//!    mid-tick coherence (as the alignment ratio), and the rolling
//!    entropy history; the zone is classified from it.
//! 5. **Reflect** -- the reflective loop gets the tick's SCUP and either
//!    records its now-state and invokes active sigils, or skips while
//!    paused.
//! 6. **Publish** -- a `tick.completed` event carrying the
//!    [`TickSummary`] goes out on the bus, plus one `sigil.expired`
//!    event per expired sigil.
//!
//! The context is mutated in place and handed to subsystems strictly one
//! at a time; later subsystems observe earlier writes within the same
//! tick. That ordering is part of the contract.

use std::collections::VecDeque;
use std::time::Duration;

use reverie_events::{Event, EventBus};
use reverie_sigils::SigilRegistry;
use reverie_types::{ReportStatus, SubsystemReport, TickContext, TickSummary};
use serde_json::json;
use tracing::{info, warn};

use crate::clock::{ClockError, TickClock};
use crate::config::EngineConfig;
use crate::reflect::{ReflectiveLoop, SigilInvoker};
use crate::scup::{ScupInputs, classify_zone, compute_scup};
use crate::subsystem::Subsystem;
use crate::subsystems::{MemorySubsystem, PulseSubsystem, SchemaSubsystem, VisualSubsystem};

/// How many per-tick entropy samples the engine retains. Only the
/// trailing five feed the SCUP fold; the rest are kept for snapshots.
const ENTROPY_HISTORY_CAPACITY: usize = 16;

/// Errors that can abort a tick.
///
/// Subsystem failures are not here on purpose: they are recovered
/// locally and never surface as tick errors.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The tick counter overflowed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// The simulation engine: clock, context, subsystems, sigil registry,
/// event bus, and reflective loop, owned together and passed by
/// reference. Nothing here is a global.
pub struct Engine {
    /// Engine configuration.
    config: EngineConfig,
    /// The monotonic tick clock.
    clock: TickClock,
    /// The shared per-tick context.
    ctx: TickContext,
    /// Registered subsystems, in invocation order.
    subsystems: Vec<Box<dyn Subsystem>>,
    /// The sigil arena.
    registry: SigilRegistry,
    /// The event bus.
    bus: EventBus,
    /// The reflective pause loop.
    reflective: ReflectiveLoop,
    /// Rolling per-tick entropy samples, oldest first.
    entropy_history: VecDeque<f64>,
}

impl Engine {
    /// Create an engine with no subsystems registered.
    pub fn new(config: EngineConfig) -> Self {
        let registry = SigilRegistry::new(config.sigils);
        let bus = EventBus::with_history_limit(config.events.history_limit);
        let reflective = ReflectiveLoop::new(
            config.scup.pause_threshold,
            config.scup.pause_cooldown_ticks,
        );
        Self {
            config,
            clock: TickClock::new(),
            ctx: TickContext::new(),
            subsystems: Vec::new(),
            registry,
            bus,
            reflective,
            entropy_history: VecDeque::new(),
        }
    }

    /// Create an engine with the four stock subsystems registered in
    /// their contractual order: pulse, schema, memory, visual.
    ///
    /// Each subsystem gets its own generator derived from the world seed
    /// so runs are reproducible.
    pub fn with_default_subsystems(config: EngineConfig) -> Self {
        let seed = config.world.seed;
        let mut engine = Self::new(config);
        engine.register_subsystem(Box::new(PulseSubsystem::new(seed)));
        engine.register_subsystem(Box::new(SchemaSubsystem::new(seed.wrapping_add(1))));
        engine.register_subsystem(Box::new(MemorySubsystem::new(seed.wrapping_add(2))));
        engine.register_subsystem(Box::new(VisualSubsystem::new(seed.wrapping_add(3))));
        engine
    }

    /// Register a subsystem at the end of the invocation order.
    ///
    /// The subsystem is initialized here, once, at registration time.
    pub fn register_subsystem(&mut self, mut subsystem: Box<dyn Subsystem>) {
        subsystem.initialize();
        info!(name = subsystem.name(), "subsystem registered");
        self.subsystems.push(subsystem);
    }

    /// Execute one complete tick.
    ///
    /// `delta` is the simulated time step handed to every subsystem;
    /// `invoker` executes active sigils on behalf of the reflective loop.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] only if the tick counter overflows.
    pub async fn advance_tick(
        &mut self,
        delta: f64,
        invoker: &mut dyn SigilInvoker,
    ) -> Result<TickSummary, TickError> {
        let tick = self.clock.advance()?;
        let timeout = Duration::from_millis(self.config.world.subsystem_timeout_ms);

        // --- Subsystems, in registration order, fail-soft ---
        let mut reports: Vec<SubsystemReport> = Vec::with_capacity(self.subsystems.len());
        for subsystem in &mut self.subsystems {
            let name = subsystem.name().to_owned();
            match tokio::time::timeout(timeout, subsystem.tick(delta, &mut self.ctx)).await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(err)) => {
                    warn!(tick, subsystem = %name, error = %err, "subsystem failed, skipping");
                    reports.push(SubsystemReport::error(&name));
                }
                Err(_elapsed) => {
                    warn!(
                        tick,
                        subsystem = %name,
                        timeout_ms = self.config.world.subsystem_timeout_ms,
                        "subsystem timed out, skipping"
                    );
                    reports.push(SubsystemReport::error(&name));
                }
            }
        }

        // --- Sigil aging, expiry, cold purge ---
        let purge_threshold = self.registry.config().purge_threshold;
        let expired = self.registry.age_and_decay_all(tick);
        let purged = self.registry.purge_cold(purge_threshold);
        self.ctx.active_sigils = self.registry.active_ids();

        // --- SCUP fold ---
        let alignment = reports
            .iter()
            .any(|r| r.name == "schema" && r.status == ReportStatus::Ok)
            .then_some(self.ctx.scup);
        let history: Vec<f64> = self.entropy_history.iter().copied().collect();
        let scup = compute_scup(&ScupInputs {
            alignment,
            pressure: self.ctx.pulse.heat,
            urgency: self.config.scup.baseline_urgency,
            sigil_entropy: self.registry.drift_entropy(),
            history: &history,
        });
        self.ctx.set_scup(scup);
        let zone = classify_zone(scup);

        self.push_entropy_sample(&reports);

        // --- Reflective loop ---
        let reflected = self.reflective.run_tick(
            tick,
            scup,
            zone,
            self.ctx.mood,
            &self.registry,
            invoker,
        );

        // --- Summary + events ---
        let summary = TickSummary {
            tick,
            scup,
            zone,
            mood: self.ctx.mood,
            pulse_heat: self.ctx.pulse.heat,
            active_sigils: self.ctx.active_sigils.clone(),
            reports,
        };

        for id in &expired {
            self.bus
                .publish(Event::new(
                    "sigil.expired",
                    json!({ "id": id, "tick": tick }),
                    "scheduler",
                ))
                .await;
        }
        for id in &purged {
            self.bus
                .publish(Event::new(
                    "sigil.purged",
                    json!({ "id": id, "tick": tick }),
                    "scheduler",
                ))
                .await;
        }

        let payload = serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null);
        self.bus
            .publish(Event::new("tick.completed", payload, "scheduler"))
            .await;

        info!(
            tick,
            scup,
            zone = %zone,
            mood = %self.ctx.mood,
            heat = self.ctx.pulse.heat,
            sigils = summary.active_sigils.len(),
            reflected,
            "tick completed"
        );

        Ok(summary)
    }

    /// Fold this tick's subsystem entropies into the rolling history.
    ///
    /// The sample is the mean entropy over subsystems that reported
    /// successfully; a tick where everything failed contributes nothing.
    #[allow(clippy::cast_precision_loss)]
    fn push_entropy_sample(&mut self, reports: &[SubsystemReport]) {
        let ok: Vec<f64> = reports
            .iter()
            .filter(|r| r.status == ReportStatus::Ok)
            .map(|r| r.entropy)
            .collect();
        if ok.is_empty() {
            return;
        }
        let sample = ok.iter().sum::<f64>() / ok.len() as f64;
        self.entropy_history.push_back(sample);
        while self.entropy_history.len() > ENTROPY_HISTORY_CAPACITY {
            self.entropy_history.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The current tick number.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// The shared tick context.
    pub const fn context(&self) -> &TickContext {
        &self.ctx
    }

    /// The sigil registry.
    pub const fn registry(&self) -> &SigilRegistry {
        &self.registry
    }

    /// Mutable access to the sigil registry (registration, activation).
    pub const fn registry_mut(&mut self) -> &mut SigilRegistry {
        &mut self.registry
    }

    /// The event bus.
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Mutable access to the event bus (subscriptions).
    pub const fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The reflective loop.
    pub const fn reflective(&self) -> &ReflectiveLoop {
        &self.reflective
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Point-in-time snapshots of every subsystem, keyed by name.
    pub fn subsystem_snapshots(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for subsystem in &self.subsystems {
            map.insert(subsystem.name().to_owned(), subsystem.snapshot());
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use reverie_types::{Mood, Zone};

    use super::*;
    use crate::reflect::RecordingInvoker;
    use crate::subsystem::SubsystemError;

    /// Subsystem that always fails.
    struct FailingSubsystem;

    #[async_trait]
    impl Subsystem for FailingSubsystem {
        fn name(&self) -> &str {
            "failing"
        }

        fn initialize(&mut self) {}

        async fn tick(
            &mut self,
            _delta: f64,
            _ctx: &mut TickContext,
        ) -> Result<SubsystemReport, SubsystemError> {
            Err(SubsystemError::Failed {
                name: String::from("failing"),
                message: String::from("deliberate test failure"),
            })
        }

        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    /// Subsystem that sleeps past any reasonable timeout.
    struct StallingSubsystem;

    #[async_trait]
    impl Subsystem for StallingSubsystem {
        fn name(&self) -> &str {
            "stalling"
        }

        fn initialize(&mut self) {}

        async fn tick(
            &mut self,
            _delta: f64,
            _ctx: &mut TickContext,
        ) -> Result<SubsystemReport, SubsystemError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(SubsystemReport::ok("stalling", 0.0))
        }

        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    /// Subsystem that records the mood it observed in the shared context.
    struct MoodProbe {
        observed: std::sync::Arc<std::sync::Mutex<Vec<Mood>>>,
    }

    #[async_trait]
    impl Subsystem for MoodProbe {
        fn name(&self) -> &str {
            "probe"
        }

        fn initialize(&mut self) {}

        async fn tick(
            &mut self,
            _delta: f64,
            ctx: &mut TickContext,
        ) -> Result<SubsystemReport, SubsystemError> {
            if let Ok(mut observed) = self.observed.lock() {
                observed.push(ctx.mood);
            }
            Ok(SubsystemReport::ok("probe", 0.0))
        }

        fn snapshot(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    fn make_engine() -> Engine {
        Engine::with_default_subsystems(EngineConfig::default())
    }

    #[tokio::test]
    async fn hundred_ticks_stay_in_bounds() {
        let mut engine = make_engine();
        let mut invoker = RecordingInvoker::default();

        for expected_tick in 1..=100 {
            let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
            assert_eq!(summary.tick, expected_tick);
            assert!(
                (0.0..=1.0).contains(&summary.scup),
                "scup out of range at tick {expected_tick}: {}",
                summary.scup
            );
            let expected_zone = if summary.scup >= 0.7 {
                Zone::Calm
            } else if summary.scup >= 0.4 {
                Zone::Active
            } else {
                Zone::Surge
            };
            assert_eq!(summary.zone, expected_zone);
            assert_eq!(summary.reports.len(), 4);
        }
    }

    #[tokio::test]
    async fn failing_subsystem_does_not_abort_the_tick() {
        let mut engine = make_engine();
        engine.register_subsystem(Box::new(FailingSubsystem));
        let mut invoker = RecordingInvoker::default();

        let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        assert_eq!(summary.reports.len(), 5);
        let failing = summary.reports.iter().find(|r| r.name == "failing").unwrap();
        assert_eq!(failing.status, ReportStatus::Error);
        assert!(failing.entropy.abs() < f64::EPSILON);
        // The healthy subsystems still reported.
        assert!(
            summary
                .reports
                .iter()
                .filter(|r| r.status == ReportStatus::Ok)
                .count()
                >= 4
        );
    }

    #[tokio::test]
    async fn stalling_subsystem_is_timed_out() {
        let mut config = EngineConfig::default();
        config.world.subsystem_timeout_ms = 20;
        let mut engine = Engine::new(config);
        engine.register_subsystem(Box::new(StallingSubsystem));
        let mut invoker = RecordingInvoker::default();

        let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        let stalled = summary.reports.iter().find(|r| r.name == "stalling").unwrap();
        assert_eq!(stalled.status, ReportStatus::Error);
    }

    #[tokio::test]
    async fn later_subsystems_observe_earlier_writes() {
        let mut engine = make_engine();
        let observed = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        engine.register_subsystem(Box::new(MoodProbe {
            observed: std::sync::Arc::clone(&observed),
        }));
        let mut invoker = RecordingInvoker::default();

        let mut summary_moods = Vec::new();
        for _ in 0..50 {
            let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
            summary_moods.push(summary.mood);
        }

        // The probe runs after schema, so each tick it must have seen
        // exactly the mood schema wrote that tick.
        let seen = observed.lock().unwrap().clone();
        assert_eq!(seen, summary_moods);
    }

    #[tokio::test]
    async fn tick_completed_event_is_published_every_tick() {
        let mut engine = make_engine();
        let mut invoker = RecordingInvoker::default();

        for _ in 0..5 {
            let _ = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        }
        assert_eq!(engine.bus().history(Some("tick.completed")).len(), 5);
    }

    #[tokio::test]
    async fn expired_sigils_emit_events_and_leave_the_context() {
        let mut engine = make_engine();
        engine.registry_mut().register_with(
            "shortlived",
            1.0,
            0.0,
            2.0,
            reverie_sigils::SigilPriority::Normal,
            0,
        );
        let mut invoker = RecordingInvoker::default();

        let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        assert!(summary.active_sigils.contains(&String::from("shortlived")));

        let _ = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
        assert!(!summary.active_sigils.contains(&String::from("shortlived")));
        assert!(!engine.bus().history(Some("sigil.expired")).is_empty());
    }

    #[tokio::test]
    async fn engine_without_schema_uses_the_flat_alignment_penalty() {
        // Only a pulse subsystem: no schema report, so the SCUP fold must
        // take the unknown-alignment branch and still stay in range.
        let config = EngineConfig::default();
        let seed = config.world.seed;
        let mut engine = Engine::new(config);
        engine.register_subsystem(Box::new(PulseSubsystem::new(seed)));
        let mut invoker = RecordingInvoker::default();

        for _ in 0..20 {
            let summary = engine.advance_tick(1.0, &mut invoker).await.unwrap();
            assert!((0.0..=1.0).contains(&summary.scup));
        }
    }

    #[tokio::test]
    async fn snapshots_cover_all_subsystems() {
        let mut engine = make_engine();
        let mut invoker = RecordingInvoker::default();
        let _ = engine.advance_tick(1.0, &mut invoker).await.unwrap();

        let snapshots = engine.subsystem_snapshots();
        for name in ["pulse", "schema", "memory", "visual"] {
            assert!(snapshots.get(name).is_some(), "missing snapshot for {name}");
        }
    }
}
