//! The schema subsystem: coherence and mood.
//!
//! Schema is the canonical writer of `ctx.scup` and `ctx.mood` among the
//! subsystems. Its coherence value is a mid-tick estimate -- the
//! scheduler later feeds it into the SCUP fold as the alignment ratio and
//! overwrites `ctx.scup` with the final score.
//!
//! Mood switches stochastically: the switch probability is inversely
//! proportional to a mood-stability value, and stability itself erodes
//! while coherence runs very high. Long stretches of near-perfect
//! coherence therefore make the mood restless.

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use reverie_types::{Mood, SubsystemReport, TickContext};
use serde_json::json;

use crate::subsystem::{Subsystem, SubsystemError};
use crate::subsystems::noise::gaussian;

/// Standard deviation of the coherence perturbation.
const PERTURBATION: f64 = 0.03;

/// Weight of the pulse-heat feedback term.
const HEAT_FEEDBACK: f64 = 0.1;

/// Base mood-switch probability at full stability.
const SWITCH_BASE: f64 = 0.08;

/// Coherence above which mood stability erodes.
const RESTLESS_COHERENCE: f64 = 0.85;

/// Lower bound on mood stability.
const MIN_STABILITY: f64 = 0.2;

/// Coherence/mood pair with stochastic mood switching.
#[derive(Debug)]
pub struct SchemaSubsystem {
    /// Seeded noise generator.
    rng: SmallRng,
    /// Current coherence estimate, in `[0, 1]`.
    coherence: f64,
    /// Current mood.
    mood: Mood,
    /// Mood stability, in `[MIN_STABILITY, 1]`. Lower means moodier.
    mood_stability: f64,
    /// Mood switches performed so far.
    mood_switches: u64,
    /// Guard for idempotent initialization.
    initialized: bool,
}

impl SchemaSubsystem {
    /// Create a schema subsystem seeded from the world seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            coherence: 0.7,
            mood: Mood::Calm,
            mood_stability: 0.8,
            mood_switches: 0,
            initialized: false,
        }
    }

    /// The current coherence estimate.
    pub const fn coherence(&self) -> f64 {
        self.coherence
    }

    /// The current mood.
    pub const fn mood(&self) -> Mood {
        self.mood
    }

    /// Pick a mood different from the current one.
    fn next_mood(&mut self) -> Mood {
        let current = self.mood;
        let candidates: Vec<Mood> = Mood::ALL.into_iter().filter(|m| *m != current).collect();
        candidates.choose(&mut self.rng).copied().unwrap_or(current)
    }
}

#[async_trait]
impl Subsystem for SchemaSubsystem {
    fn name(&self) -> &str {
        "schema"
    }

    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.coherence = 0.7;
        self.mood = Mood::Calm;
        self.mood_stability = 0.8;
        self.initialized = true;
    }

    async fn tick(
        &mut self,
        _delta: f64,
        ctx: &mut TickContext,
    ) -> Result<SubsystemReport, SubsystemError> {
        // Coherence drifts under Gaussian perturbation plus feedback from
        // the pulse heat written earlier this tick: heat above the resting
        // level pulls coherence down, heat below pushes it up.
        let perturbation = gaussian(&mut self.rng, 0.0, PERTURBATION);
        let feedback = (0.5 - ctx.pulse.heat) * HEAT_FEEDBACK;
        self.coherence = (self.coherence + perturbation + feedback).clamp(0.0, 1.0);

        // Very high coherence makes the mood restless.
        if self.coherence > RESTLESS_COHERENCE {
            self.mood_stability -= 0.02;
        } else {
            self.mood_stability += 0.01;
        }
        self.mood_stability = self.mood_stability.clamp(MIN_STABILITY, 1.0);

        let switch_probability = (SWITCH_BASE / self.mood_stability).clamp(0.0, 1.0);
        if self.rng.random_bool(switch_probability) {
            self.mood = self.next_mood();
            self.mood_switches = self.mood_switches.saturating_add(1);
        }

        ctx.set_scup(self.coherence);
        ctx.mood = self.mood;

        let entropy =
            (perturbation.abs() + (1.0 - self.coherence) * 0.2).clamp(0.0, 1.0);
        Ok(SubsystemReport::ok(self.name(), entropy).with_details(json!({
            "coherence": self.coherence,
            "mood": self.mood.as_str(),
            "mood_stability": self.mood_stability,
        })))
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "coherence": self.coherence,
            "mood": self.mood.as_str(),
            "mood_stability": self.mood_stability,
            "mood_switches": self.mood_switches,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::Rng;
    use reverie_types::{PulseState, PulseZone};

    use super::*;

    #[tokio::test]
    async fn writes_scup_and_mood_into_context() {
        let mut schema = SchemaSubsystem::new(42);
        schema.initialize();
        let mut ctx = TickContext::new();

        let _ = schema.tick(1.0, &mut ctx).await.unwrap();
        assert!((ctx.scup - schema.coherence()).abs() < f64::EPSILON);
        assert_eq!(ctx.mood, schema.mood());
    }

    #[tokio::test]
    async fn coherence_stays_in_unit_range() {
        let mut schema = SchemaSubsystem::new(42);
        schema.initialize();
        let mut ctx = TickContext::new();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..500 {
            ctx.pulse = PulseState {
                heat: rng.random_range(0.0..=1.0),
                zone: PulseZone::Calm,
            };
            let report = schema.tick(1.0, &mut ctx).await.unwrap();
            assert!((0.0..=1.0).contains(&schema.coherence()));
            assert!((0.0..=1.0).contains(&report.entropy));
        }
    }

    #[tokio::test]
    async fn hot_pulse_pulls_coherence_down() {
        // With a maximally hot pulse the feedback term is -0.05 per tick;
        // over many ticks coherence must end lower than it started even
        // against the perturbation noise.
        let mut schema = SchemaSubsystem::new(42);
        schema.initialize();
        let mut ctx = TickContext::new();
        ctx.pulse = PulseState {
            heat: 1.0,
            zone: PulseZone::Hot,
        };

        for _ in 0..50 {
            let _ = schema.tick(1.0, &mut ctx).await.unwrap();
        }
        assert!(schema.coherence() < 0.5);
    }

    #[tokio::test]
    async fn mood_eventually_switches() {
        let mut schema = SchemaSubsystem::new(42);
        schema.initialize();
        let mut ctx = TickContext::new();

        let mut seen_other = false;
        for _ in 0..500 {
            let _ = schema.tick(1.0, &mut ctx).await.unwrap();
            if ctx.mood != Mood::Calm {
                seen_other = true;
                break;
            }
        }
        assert!(seen_other, "mood never left calm in 500 ticks");
    }

    #[test]
    fn next_mood_never_repeats_current() {
        let mut schema = SchemaSubsystem::new(42);
        for _ in 0..100 {
            let current = schema.mood();
            let next = schema.next_mood();
            assert_ne!(next, current);
            schema.mood = next;
        }
    }
}
