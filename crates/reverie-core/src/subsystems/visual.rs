//! The visual subsystem: display pattern selection.
//!
//! Purely presentational: picks a pattern name from the current mood and
//! pulse zone for external rendering collaborators. Runs last in
//! registration order so it sees everything the other subsystems wrote
//! this tick.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use reverie_types::{Mood, PulseZone, SubsystemReport, TickContext};
use serde_json::json;

use crate::subsystem::{Subsystem, SubsystemError};
use crate::subsystems::noise::gaussian;

/// Standard deviation of the entropy jitter.
const JITTER: f64 = 0.05;

/// Display pattern selection for external renderers.
#[derive(Debug)]
pub struct VisualSubsystem {
    /// Seeded jitter generator.
    rng: SmallRng,
    /// Most recently selected pattern name.
    pattern: String,
    /// Ticks processed.
    ticks: u64,
    /// Guard for idempotent initialization.
    initialized: bool,
}

impl VisualSubsystem {
    /// Create a visual subsystem seeded from the world seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            pattern: String::from("drift"),
            ticks: 0,
            initialized: false,
        }
    }

    /// The most recently selected pattern name.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Map a mood to its base pattern name.
    const fn base_pattern(mood: Mood) -> &'static str {
        match mood {
            Mood::Calm => "drift",
            Mood::Contemplative => "spiral",
            Mood::Focused => "lattice",
            Mood::Curious => "weave",
            Mood::Energetic => "bloom",
            Mood::Agitated => "fracture",
        }
    }

    /// Map a pulse zone to its pattern modifier.
    const fn zone_modifier(zone: PulseZone) -> &'static str {
        match zone {
            PulseZone::Calm => "-dim",
            PulseZone::Active => "",
            PulseZone::Warm => "-glow",
            PulseZone::Hot => "-flare",
        }
    }
}

#[async_trait]
impl Subsystem for VisualSubsystem {
    fn name(&self) -> &str {
        "visual"
    }

    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.pattern = String::from("drift");
        self.initialized = true;
    }

    async fn tick(
        &mut self,
        _delta: f64,
        ctx: &mut TickContext,
    ) -> Result<SubsystemReport, SubsystemError> {
        self.pattern = format!(
            "{}{}",
            Self::base_pattern(ctx.mood),
            Self::zone_modifier(ctx.pulse.zone)
        );
        self.ticks = self.ticks.saturating_add(1);

        let jitter = gaussian(&mut self.rng, 0.0, JITTER).abs();
        let entropy = ctx.pulse.heat.mul_add(0.2, jitter).clamp(0.0, 1.0);

        Ok(SubsystemReport::ok(self.name(), entropy).with_details(json!({
            "pattern": self.pattern,
        })))
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "pattern": self.pattern,
            "ticks": self.ticks,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reverie_types::PulseState;

    use super::*;

    #[tokio::test]
    async fn pattern_reflects_mood_and_zone() {
        let mut visual = VisualSubsystem::new(42);
        visual.initialize();
        let mut ctx = TickContext::new();
        ctx.mood = Mood::Energetic;
        ctx.pulse = PulseState {
            heat: 0.9,
            zone: PulseZone::Hot,
        };

        let report = visual.tick(1.0, &mut ctx).await.unwrap();
        assert_eq!(visual.pattern(), "bloom-flare");
        assert_eq!(report.details["pattern"], "bloom-flare");
    }

    #[tokio::test]
    async fn active_zone_has_no_modifier() {
        let mut visual = VisualSubsystem::new(42);
        visual.initialize();
        let mut ctx = TickContext::new();
        ctx.mood = Mood::Focused;
        ctx.pulse = PulseState {
            heat: 0.5,
            zone: PulseZone::Active,
        };

        let _ = visual.tick(1.0, &mut ctx).await.unwrap();
        assert_eq!(visual.pattern(), "lattice");
    }

    #[tokio::test]
    async fn entropy_stays_in_unit_range() {
        let mut visual = VisualSubsystem::new(42);
        visual.initialize();
        let mut ctx = TickContext::new();
        ctx.pulse = PulseState {
            heat: 1.0,
            zone: PulseZone::Hot,
        };

        for _ in 0..200 {
            let report = visual.tick(1.0, &mut ctx).await.unwrap();
            assert!((0.0..=1.0).contains(&report.entropy));
        }
    }

    #[tokio::test]
    async fn every_mood_has_a_distinct_base_pattern() {
        let mut visual = VisualSubsystem::new(42);
        visual.initialize();
        let mut ctx = TickContext::new();
        ctx.pulse = PulseState {
            heat: 0.5,
            zone: PulseZone::Active,
        };

        let mut seen = std::collections::BTreeSet::new();
        for mood in Mood::ALL {
            ctx.mood = mood;
            let _ = visual.tick(1.0, &mut ctx).await.unwrap();
            seen.insert(visual.pattern().to_owned());
        }
        assert_eq!(seen.len(), Mood::ALL.len());
    }
}
