//! The memory subsystem: probabilistic trace formation.
//!
//! Each tick the subsystem may form a memory trace keyed on the current
//! coherence -- the more coherent the system, the likelier a trace forms.
//! Traces live in a bounded recent buffer; its fill level drives a recall
//! rate and a consolidation pressure that feeds the entropy fold.

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use reverie_types::{Mood, SubsystemReport, TickContext};
use serde_json::json;

use crate::subsystem::{Subsystem, SubsystemError};

/// Capacity of the recent-trace buffer.
const BUFFER_CAPACITY: usize = 100;

/// Base formation probability at zero coherence.
const FORMATION_BASE: f64 = 0.1;

/// Additional formation probability per unit of coherence.
const FORMATION_SCALE: f64 = 0.6;

/// One formed memory trace.
#[derive(Debug, Clone, PartialEq)]
struct MemoryTrace {
    /// Coherence at formation time.
    scup: f64,
    /// Mood at formation time.
    mood: Mood,
}

/// Probabilistic memory formation over a bounded buffer.
#[derive(Debug)]
pub struct MemorySubsystem {
    /// Seeded formation-roll generator.
    rng: SmallRng,
    /// Recent traces, oldest first.
    recent: VecDeque<MemoryTrace>,
    /// Total traces formed over the subsystem's lifetime.
    formed_total: u64,
    /// Guard for idempotent initialization.
    initialized: bool,
}

impl MemorySubsystem {
    /// Create a memory subsystem seeded from the world seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            recent: VecDeque::new(),
            formed_total: 0,
            initialized: false,
        }
    }

    /// Fraction of the recent buffer currently filled.
    #[allow(clippy::cast_precision_loss)]
    pub fn recall_rate(&self) -> f64 {
        self.recent.len() as f64 / BUFFER_CAPACITY as f64
    }

    /// Number of traces in the recent buffer.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Mean coherence across the recent traces (0 when empty).
    #[allow(clippy::cast_precision_loss)]
    fn mean_trace_scup(&self) -> f64 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent.iter().map(|trace| trace.scup).sum::<f64>() / self.recent.len() as f64
    }
}

#[async_trait]
impl Subsystem for MemorySubsystem {
    fn name(&self) -> &str {
        "memory"
    }

    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.recent.clear();
        self.initialized = true;
    }

    async fn tick(
        &mut self,
        _delta: f64,
        ctx: &mut TickContext,
    ) -> Result<SubsystemReport, SubsystemError> {
        let formation_probability =
            ctx.scup.mul_add(FORMATION_SCALE, FORMATION_BASE).clamp(0.0, 1.0);

        let formed = self.rng.random_bool(formation_probability);
        if formed {
            self.recent.push_back(MemoryTrace {
                scup: ctx.scup,
                mood: ctx.mood,
            });
            while self.recent.len() > BUFFER_CAPACITY {
                self.recent.pop_front();
            }
            self.formed_total = self.formed_total.saturating_add(1);
        }

        let recall_rate = self.recall_rate();
        let consolidation_pressure = recall_rate * (1.0 - ctx.scup);
        let entropy = consolidation_pressure * 0.2;

        Ok(SubsystemReport::ok(self.name(), entropy).with_details(json!({
            "formed": formed,
            "recall_rate": recall_rate,
            "consolidation_pressure": consolidation_pressure,
        })))
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "recent_count": self.recent.len(),
            "capacity": BUFFER_CAPACITY,
            "recall_rate": self.recall_rate(),
            "mean_trace_scup": self.mean_trace_scup(),
            "last_mood": self.recent.back().map(|trace| trace.mood.as_str()),
            "formed_total": self.formed_total,
        })
    }
}
