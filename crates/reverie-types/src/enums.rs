//! Enumeration types for the Reverie simulation core.
//!
//! All enums serialize as lowercase strings so they match the wire and
//! log formats consumed by external tracer and plotting collaborators.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operating zone
// ---------------------------------------------------------------------------

/// Coarse operating-mode label derived deterministically from the SCUP
/// coherence score.
///
/// A zone is a pure derived value: it is always recomputed from SCUP and
/// never stored as an independent source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// High coherence: the system is stable and unhurried.
    Calm,
    /// Moderate coherence: normal working conditions.
    Active,
    /// Low coherence: the system is under pressure.
    Surge,
}

impl Zone {
    /// Return the lowercase name used in log lines and event payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Active => "active",
            Self::Surge => "surge",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// The closed mood vocabulary maintained by the schema subsystem.
///
/// Moods influence display pattern selection and memory formation but
/// carry no scheduling semantics of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Settled, low-arousal baseline.
    #[default]
    Calm,
    /// Inward-facing, reflective.
    Contemplative,
    /// Narrow attention, task-driven.
    Focused,
    /// Outward-facing, exploratory.
    Curious,
    /// High arousal, positive valence.
    Energetic,
    /// High arousal, negative valence.
    Agitated,
}

impl Mood {
    /// All moods, in the order the schema subsystem cycles candidates.
    pub const ALL: [Self; 6] = [
        Self::Calm,
        Self::Contemplative,
        Self::Focused,
        Self::Curious,
        Self::Energetic,
        Self::Agitated,
    ];

    /// Return the lowercase name used in log lines and event payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Contemplative => "contemplative",
            Self::Focused => "focused",
            Self::Curious => "curious",
            Self::Energetic => "energetic",
            Self::Agitated => "agitated",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pulse display zone
// ---------------------------------------------------------------------------

/// The pulse subsystem's private display bucketing of its heat value.
///
/// This is a separate scale from [`Zone`] and never feeds zone
/// classification; it exists purely for external rendering collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseZone {
    /// Heat below 0.35.
    #[default]
    Calm,
    /// Heat in `[0.35, 0.6)`.
    Active,
    /// Heat in `[0.6, 0.8)`.
    Warm,
    /// Heat at or above 0.8.
    Hot,
}

impl PulseZone {
    /// Bucket a heat value into its display zone.
    pub fn from_heat(heat: f64) -> Self {
        if heat >= 0.8 {
            Self::Hot
        } else if heat >= 0.6 {
            Self::Warm
        } else if heat >= 0.35 {
            Self::Active
        } else {
            Self::Calm
        }
    }

    /// Return the lowercase name used in snapshots and event payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Active => "active",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

impl std::fmt::Display for PulseZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Report status
// ---------------------------------------------------------------------------

/// Outcome of a single subsystem invocation within a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// The subsystem completed its tick contribution.
    #[default]
    Ok,
    /// The subsystem failed or timed out; its contribution was skipped.
    Error,
}
