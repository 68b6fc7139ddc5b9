//! The sigil record and its tuning configuration.

use serde::{Deserialize, Serialize};

/// Execution priority of a sigil.
///
/// Persistent sigils are logged distinctly by the reflective loop but are
/// not treated specially in execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigilPriority {
    /// Ordinary short-lived sigil.
    #[default]
    Normal,
    /// Long-running intent; survives like any other sigil but is called
    /// out in logs.
    Persistent,
}

/// A short-lived symbolic token.
///
/// All numeric fields are clamped once at construction; the registry's
/// aging pass maintains the invariants from then on. There is no
/// defensive re-validation on access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sigil {
    /// Caller-chosen identifier, unique within the registry.
    pub id: String,

    /// Activation heat, in `[0, 1]`. Decays every tick; boosted by
    /// activation.
    pub heat: f64,

    /// Volatility estimate, in `[0, 1]`. Recomputed every aging pass from
    /// heat deficit and relative age.
    pub entropy: f64,

    /// Remaining lifespan in ticks. Shrinks with entropy each pass,
    /// floored at 1.0.
    pub lifespan: f64,

    /// Tick at which the sigil was registered.
    pub created_at_tick: u64,

    /// Age in ticks, recomputed every aging pass.
    pub age_ticks: u64,

    /// Tick of the most recent activation (or registration).
    pub last_used_tick: u64,

    /// Execution priority.
    pub priority: SigilPriority,
}

impl Sigil {
    /// Create a sigil, clamping malformed inputs to their documented
    /// ranges: heat and entropy to `[0, 1]`, lifespan floored at 1.0.
    /// Non-finite values fall back to the same defaults the original
    /// system substituted (full heat, zero entropy).
    pub fn new(id: &str, heat: f64, entropy: f64, lifespan: f64, tick: u64) -> Self {
        let heat = if heat.is_finite() { heat.clamp(0.0, 1.0) } else { 1.0 };
        let entropy = if entropy.is_finite() {
            entropy.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lifespan = if lifespan.is_finite() {
            lifespan.max(1.0)
        } else {
            1.0
        };
        Self {
            id: id.to_owned(),
            heat,
            entropy,
            lifespan,
            created_at_tick: tick,
            age_ticks: 0,
            last_used_tick: tick,
            priority: SigilPriority::Normal,
        }
    }

    /// Mark the sigil as persistent-priority.
    #[must_use]
    pub const fn persistent(mut self) -> Self {
        self.priority = SigilPriority::Persistent;
        self
    }

    /// Whether the sigil has outlived its (shrinking) lifespan.
    #[allow(clippy::cast_precision_loss)]
    pub fn is_expired(&self) -> bool {
        self.age_ticks as f64 >= self.lifespan
    }
}

/// Tuning knobs for the sigil lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigilConfig {
    /// Base heat lost per tick, before the drift multiplier.
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,

    /// Fraction of lifespan removed per unit of entropy each tick.
    #[serde(default = "default_shrink_rate")]
    pub shrink_rate: f64,

    /// Heat at or below which a sigil is cold-purged regardless of age.
    #[serde(default = "default_purge_threshold")]
    pub purge_threshold: f64,

    /// Lifespan in ticks given to sigils registered without one.
    #[serde(default = "default_lifespan")]
    pub default_lifespan: f64,

    /// Heat given to sigils registered without one.
    #[serde(default = "default_heat")]
    pub default_heat: f64,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            decay_rate: default_decay_rate(),
            shrink_rate: default_shrink_rate(),
            purge_threshold: default_purge_threshold(),
            default_lifespan: default_lifespan(),
            default_heat: default_heat(),
        }
    }
}

const fn default_decay_rate() -> f64 {
    0.05
}

const fn default_shrink_rate() -> f64 {
    0.05
}

const fn default_purge_threshold() -> f64 {
    0.05
}

const fn default_lifespan() -> f64 {
    20.0
}

const fn default_heat() -> f64 {
    1.0
}
