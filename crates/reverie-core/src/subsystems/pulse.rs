//! The pulse subsystem: a thermally-oscillating heat source.
//!
//! Heat follows a slow sinusoid with Gaussian jitter, so the system
//! breathes between cool and hot phases instead of sitting at a fixed
//! point. The heat value is the canonical pressure input for the SCUP
//! fold; the display zone bucketing is private to this subsystem and
//! never feeds zone classification.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use reverie_types::{PulseState, PulseZone, SubsystemReport, TickContext};
use serde_json::json;

use crate::subsystem::{Subsystem, SubsystemError};
use crate::subsystems::noise::gaussian;

/// Resting heat level the oscillation swings around.
const BASE_HEAT: f64 = 0.5;

/// Amplitude of the sinusoidal swing.
const AMPLITUDE: f64 = 0.35;

/// Phase advanced per unit of delta.
const PHASE_STEP: f64 = 0.1;

/// Standard deviation of the per-tick jitter.
const JITTER: f64 = 0.05;

/// Thermally-oscillating heat source.
#[derive(Debug)]
pub struct PulseSubsystem {
    /// Seeded noise generator.
    rng: SmallRng,
    /// Accumulated oscillation phase.
    phase: f64,
    /// Most recent heat value.
    heat: f64,
    /// Most recent display zone.
    zone: PulseZone,
    /// Ticks processed.
    ticks: u64,
    /// Guard for idempotent initialization.
    initialized: bool,
}

impl PulseSubsystem {
    /// Create a pulse subsystem seeded from the world seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            phase: 0.0,
            heat: BASE_HEAT,
            zone: PulseZone::from_heat(BASE_HEAT),
            ticks: 0,
            initialized: false,
        }
    }

    /// The most recent heat value.
    pub const fn heat(&self) -> f64 {
        self.heat
    }
}

#[async_trait]
impl Subsystem for PulseSubsystem {
    fn name(&self) -> &str {
        "pulse"
    }

    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.phase = 0.0;
        self.heat = BASE_HEAT;
        self.zone = PulseZone::from_heat(BASE_HEAT);
        self.initialized = true;
    }

    async fn tick(
        &mut self,
        delta: f64,
        ctx: &mut TickContext,
    ) -> Result<SubsystemReport, SubsystemError> {
        self.phase += PHASE_STEP * delta;
        let jitter = gaussian(&mut self.rng, 0.0, JITTER);
        self.heat = AMPLITUDE
            .mul_add(self.phase.sin(), BASE_HEAT + jitter)
            .clamp(0.0, 1.0);
        self.zone = PulseZone::from_heat(self.heat);
        self.ticks = self.ticks.saturating_add(1);

        ctx.pulse = PulseState {
            heat: self.heat,
            zone: self.zone,
        };

        let entropy = self.heat * 0.3;
        Ok(SubsystemReport::ok(self.name(), entropy).with_details(json!({
            "heat": self.heat,
            "zone": self.zone.as_str(),
        })))
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "heat": self.heat,
            "zone": self.zone.as_str(),
            "ticks": self.ticks,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reverie_types::ReportStatus;

    use super::*;

    #[tokio::test]
    async fn heat_stays_in_unit_range() {
        let mut pulse = PulseSubsystem::new(42);
        pulse.initialize();
        let mut ctx = TickContext::new();

        for _ in 0..500 {
            let report = pulse.tick(1.0, &mut ctx).await.unwrap();
            assert!((0.0..=1.0).contains(&ctx.pulse.heat));
            assert!((0.0..=1.0).contains(&report.entropy));
            assert_eq!(report.status, ReportStatus::Ok);
        }
    }

    #[tokio::test]
    async fn entropy_is_heat_scaled() {
        let mut pulse = PulseSubsystem::new(42);
        pulse.initialize();
        let mut ctx = TickContext::new();

        let report = pulse.tick(1.0, &mut ctx).await.unwrap();
        assert!((report.entropy - ctx.pulse.heat * 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zone_matches_heat_bucket() {
        let mut pulse = PulseSubsystem::new(42);
        pulse.initialize();
        let mut ctx = TickContext::new();

        for _ in 0..50 {
            let _ = pulse.tick(1.0, &mut ctx).await.unwrap();
            assert_eq!(ctx.pulse.zone, PulseZone::from_heat(ctx.pulse.heat));
        }
    }

    #[tokio::test]
    async fn seeded_runs_reproduce() {
        let mut a = PulseSubsystem::new(7);
        let mut b = PulseSubsystem::new(7);
        a.initialize();
        b.initialize();
        let mut ctx_a = TickContext::new();
        let mut ctx_b = TickContext::new();

        for _ in 0..20 {
            let _ = a.tick(1.0, &mut ctx_a).await.unwrap();
            let _ = b.tick(1.0, &mut ctx_b).await.unwrap();
            assert!((ctx_a.pulse.heat - ctx_b.pulse.heat).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut pulse = PulseSubsystem::new(42);
        pulse.initialize();
        pulse.phase = 3.0;
        pulse.initialize();
        assert!((pulse.phase - 3.0).abs() < f64::EPSILON);
    }
}
