//! The sigil arena and its lifecycle operations.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::sigil::{Sigil, SigilConfig, SigilPriority};

/// Stable handle into the registry's slot vector.
///
/// Handles are internal bookkeeping; callers address sigils by id. A slot
/// index is only reused after its sigil has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SigilHandle(usize);

/// Flat arena of alive sigils.
///
/// Storage is a slot vector with a free list, plus a by-id index, so the
/// once-per-tick aging pass is a single linear sweep with no per-sigil
/// allocation. The registry is plain owned state injected into the
/// engine; it holds no locks and must not be shared across tasks.
#[derive(Debug)]
pub struct SigilRegistry {
    /// Lifecycle tuning knobs.
    config: SigilConfig,

    /// Slot storage; `None` marks a free slot.
    slots: Vec<Option<Sigil>>,

    /// Indices of free slots available for reuse.
    free: Vec<usize>,

    /// Id -> slot index.
    index: BTreeMap<String, SigilHandle>,
}

impl SigilRegistry {
    /// Create an empty registry with the given configuration.
    pub const fn new(config: SigilConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// The registry's configuration.
    pub const fn config(&self) -> &SigilConfig {
        &self.config
    }

    /// Number of alive sigils.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the registry holds no alive sigils.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether a sigil with the given id is alive.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up an alive sigil by id.
    pub fn get(&self, id: &str) -> Option<&Sigil> {
        let handle = self.index.get(id)?;
        self.slots.get(handle.0)?.as_ref()
    }

    /// Ids of all alive sigils, ordered by id.
    pub fn active_ids(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Snapshots of all alive sigils, ordered by id.
    pub fn active_sigils(&self) -> Vec<Sigil> {
        self.index
            .values()
            .filter_map(|handle| self.slots.get(handle.0).and_then(Option::as_ref))
            .cloned()
            .collect()
    }

    /// Sum of entropy over all alive sigils.
    ///
    /// This is the aggregate symbolic load that drives the shared decay
    /// multiplier, and it also feeds the SCUP calculation as the sigil
    /// entropy input.
    pub fn drift_entropy(&self) -> f64 {
        self.index
            .values()
            .filter_map(|handle| self.slots.get(handle.0).and_then(Option::as_ref))
            .map(|sigil| sigil.entropy)
            .sum()
    }

    // -----------------------------------------------------------------------
    // Lifecycle operations
    // -----------------------------------------------------------------------

    /// Register a sigil with the configured default heat and lifespan.
    ///
    /// An existing sigil with the same id is replaced.
    pub fn register(&mut self, id: &str, tick: u64) {
        let sigil = Sigil::new(
            id,
            self.config.default_heat,
            0.0,
            self.config.default_lifespan,
            tick,
        );
        self.insert(sigil);
    }

    /// Register a fully specified sigil.
    ///
    /// Inputs are clamped by [`Sigil::new`]; an existing sigil with the
    /// same id is replaced.
    pub fn register_with(
        &mut self,
        id: &str,
        heat: f64,
        entropy: f64,
        lifespan: f64,
        priority: SigilPriority,
        tick: u64,
    ) {
        let mut sigil = Sigil::new(id, heat, entropy, lifespan, tick);
        sigil.priority = priority;
        self.insert(sigil);
    }

    /// Boost a sigil's heat, clamped to 1.0, and refresh its last-used
    /// tick. If no sigil with the id is alive, one is created with the
    /// registry defaults first.
    pub fn activate(&mut self, id: &str, boost: f64, tick: u64) {
        if !self.contains(id) {
            self.register(id, tick);
        }
        if let Some(sigil) = self.get_mut(id) {
            sigil.heat = (sigil.heat + boost.max(0.0)).clamp(0.0, 1.0);
            sigil.last_used_tick = tick;
            debug!(id, heat = sigil.heat, tick, "sigil activated");
        }
    }

    /// Run the once-per-tick aging and decay pass.
    ///
    /// First the aggregate drift entropy of the registry is folded into a
    /// shared decay multiplier (`1 + 0.6 * drift`), then every alive
    /// sigil is updated in one sweep:
    ///
    /// 1. `age_ticks` is recomputed from the current tick.
    /// 2. `entropy` becomes `min(1, (1 - heat) + age / lifespan)`.
    /// 3. `heat` loses `decay_rate * multiplier`, floored at 0.
    /// 4. `lifespan` shrinks by its own entropy
    ///    (`lifespan * (1 - shrink_rate * entropy)`), floored at 1.0.
    ///    The shrink compounds every tick; the 1.0 floor is the only
    ///    guard against it.
    /// 5. Sigils whose `age_ticks >= lifespan` are removed in the same
    ///    pass.
    ///
    /// Returns the ids of sigils that expired, ordered by id.
    #[allow(clippy::cast_precision_loss)]
    pub fn age_and_decay_all(&mut self, tick: u64) -> Vec<String> {
        let drift = self.drift_entropy();
        let multiplier = 0.6f64.mul_add(drift, 1.0);

        let mut expired = Vec::new();

        for slot in &mut self.slots {
            let Some(sigil) = slot.as_mut() else {
                continue;
            };

            sigil.age_ticks = tick.saturating_sub(sigil.created_at_tick);
            let relative_age = sigil.age_ticks as f64 / sigil.lifespan;
            sigil.entropy = ((1.0 - sigil.heat) + relative_age).min(1.0);
            sigil.heat = (sigil.heat - self.config.decay_rate * multiplier).max(0.0);
            sigil.lifespan =
                (sigil.lifespan * (1.0 - self.config.shrink_rate * sigil.entropy)).max(1.0);

            if sigil.is_expired() {
                expired.push(sigil.id.clone());
            }
        }

        expired.sort();
        for id in &expired {
            self.remove(id);
            info!(id, tick, "sigil expired");
        }

        expired
    }

    /// Remove every alive sigil whose heat has fallen at or below the
    /// threshold, regardless of age. Returns the ids removed, ordered
    /// by id.
    pub fn purge_cold(&mut self, threshold: f64) -> Vec<String> {
        let mut cold: Vec<String> = self
            .index
            .iter()
            .filter_map(|(id, handle)| {
                let sigil = self.slots.get(handle.0)?.as_ref()?;
                (sigil.heat <= threshold).then(|| id.clone())
            })
            .collect();
        cold.sort();

        for id in &cold {
            self.remove(id);
            debug!(id, threshold, "sigil cold-purged");
        }

        cold
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Mutable lookup by id.
    fn get_mut(&mut self, id: &str) -> Option<&mut Sigil> {
        let handle = self.index.get(id)?;
        self.slots.get_mut(handle.0)?.as_mut()
    }

    /// Place a sigil into a slot, reusing a free one when available.
    fn insert(&mut self, sigil: Sigil) {
        let id = sigil.id.clone();

        // Replace in place if the id is already alive.
        if let Some(existing) = self.get_mut(&id) {
            *existing = sigil;
            return;
        }

        let slot_index = match self.free.pop() {
            Some(index) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = Some(sigil);
                }
                index
            }
            None => {
                self.slots.push(Some(sigil));
                self.slots.len().saturating_sub(1)
            }
        };

        self.index.insert(id, SigilHandle(slot_index));
    }

    /// Remove a sigil by id, returning its slot to the free list.
    fn remove(&mut self, id: &str) -> Option<Sigil> {
        let handle = self.index.remove(id)?;
        let removed = self.slots.get_mut(handle.0)?.take();
        if removed.is_some() {
            self.free.push(handle.0);
        }
        removed
    }
}

impl Default for SigilRegistry {
    fn default() -> Self {
        Self::new(SigilConfig::default())
    }
}
