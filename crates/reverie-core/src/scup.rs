//! Pure SCUP computation and zone classification.
//!
//! SCUP (Semantic Coherence Under Pressure) is the core's single
//! composite health score. Both functions here are pure, deterministic,
//! and stateless: the same inputs always produce the same outputs, which
//! makes them the natural unit-test anchor for the whole engine.

use reverie_types::Zone;

/// How many trailing history samples feed the historical entropy penalty.
const HISTORY_WINDOW: usize = 5;

/// Inputs to one SCUP computation.
///
/// All pressure-like inputs are expected in `[0, 1]`; the computation
/// clamps its result regardless, so out-of-range inputs degrade
/// gracefully instead of propagating.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScupInputs<'a> {
    /// Structural-alignment ratio in `[0, 1]`, when known. `None` applies
    /// a flat default penalty instead.
    pub alignment: Option<f64>,

    /// Current pressure level.
    pub pressure: f64,

    /// Current urgency level.
    pub urgency: f64,

    /// Aggregate sigil entropy (the registry's drift entropy).
    pub sigil_entropy: f64,

    /// Historical entropy samples, oldest first. Only the trailing
    /// window is used.
    pub history: &'a [f64],
}

/// Compute the SCUP coherence score from the given inputs.
///
/// Coherence starts at 1.0 and is eroded by each pressure source:
/// `pressure * 0.3`, `urgency * 0.2`, `sigil_entropy * 0.3`, the mean of
/// the last five historical entropy samples `* 0.2` (when any exist),
/// and an alignment penalty of `(1 - alignment) * 0.2` -- or a flat 0.1
/// when the alignment ratio is unknown. The result is clamped to
/// `[0, 1]`.
pub fn compute_scup(inputs: &ScupInputs<'_>) -> f64 {
    let mut coherence = 1.0;

    coherence -= inputs.pressure * 0.3;
    coherence -= inputs.urgency * 0.2;
    coherence -= inputs.sigil_entropy * 0.3;

    if !inputs.history.is_empty() {
        coherence -= recent_mean(inputs.history) * 0.2;
    }

    match inputs.alignment {
        Some(alignment) => coherence -= (1.0 - alignment) * 0.2,
        None => coherence -= 0.1,
    }

    coherence.clamp(0.0, 1.0)
}

/// Classify a SCUP score into its operating zone.
///
/// Boundaries are inclusive: exactly 0.7 is [`Zone::Calm`] and exactly
/// 0.4 is [`Zone::Active`].
pub fn classify_zone(scup: f64) -> Zone {
    if scup >= 0.7 {
        Zone::Calm
    } else if scup >= 0.4 {
        Zone::Active
    } else {
        Zone::Surge
    }
}

/// Mean of the trailing [`HISTORY_WINDOW`] samples.
#[allow(clippy::cast_precision_loss)]
fn recent_mean(history: &[f64]) -> f64 {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let window = history.get(start..).unwrap_or_default();
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn unpressured_system_is_coherent() {
        let scup = compute_scup(&ScupInputs {
            alignment: Some(1.0),
            pressure: 0.0,
            urgency: 0.0,
            sigil_entropy: 0.0,
            history: &[],
        });
        assert!((scup - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_alignment_costs_a_flat_penalty() {
        let scup = compute_scup(&ScupInputs {
            alignment: None,
            pressure: 0.0,
            urgency: 0.0,
            sigil_entropy: 0.0,
            history: &[],
        });
        assert!((scup - 0.9).abs() < 1e-9);
    }

    #[test]
    fn each_pressure_source_erodes_coherence() {
        let scup = compute_scup(&ScupInputs {
            alignment: Some(0.5),
            pressure: 0.5,
            urgency: 0.5,
            sigil_entropy: 0.5,
            history: &[0.5],
        });
        // 1.0 - 0.15 - 0.1 - 0.15 - 0.1 - 0.1 = 0.4
        assert!((scup - 0.4).abs() < 1e-9);
    }

    #[test]
    fn history_mean_uses_last_five_samples() {
        // Seven samples; the first two (all 1.0) must be ignored.
        let history = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let scup = compute_scup(&ScupInputs {
            alignment: Some(1.0),
            pressure: 0.0,
            urgency: 0.0,
            sigil_entropy: 0.0,
            history: &history,
        });
        assert!((scup - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn result_is_clamped_under_extreme_pressure() {
        let scup = compute_scup(&ScupInputs {
            alignment: Some(0.0),
            pressure: 1.0,
            urgency: 1.0,
            sigil_entropy: 1.0,
            history: &[1.0, 1.0, 1.0, 1.0, 1.0],
        });
        assert!(scup.abs() < f64::EPSILON);
    }

    #[test]
    fn scup_stays_in_unit_range_over_random_inputs() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let alignment = if rng.random_bool(0.5) {
                Some(rng.random_range(0.0..=1.0))
            } else {
                None
            };
            let history: Vec<f64> = (0..rng.random_range(0..8))
                .map(|_| rng.random_range(0.0..=1.0))
                .collect();
            let scup = compute_scup(&ScupInputs {
                alignment,
                pressure: rng.random_range(0.0..=1.0),
                urgency: rng.random_range(0.0..=1.0),
                sigil_entropy: rng.random_range(0.0..=2.0),
                history: &history,
            });
            assert!((0.0..=1.0).contains(&scup), "scup out of range: {scup}");
        }
    }

    #[test]
    fn zone_boundaries_are_inclusive() {
        assert_eq!(classify_zone(0.75), Zone::Calm);
        assert_eq!(classify_zone(0.7), Zone::Calm);
        assert_eq!(classify_zone(0.5), Zone::Active);
        assert_eq!(classify_zone(0.4), Zone::Active);
        assert_eq!(classify_zone(0.39), Zone::Surge);
        assert_eq!(classify_zone(0.1), Zone::Surge);
        assert_eq!(classify_zone(0.0), Zone::Surge);
    }
}
