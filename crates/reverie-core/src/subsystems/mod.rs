//! The four concrete subsystems shipped with the core.
//!
//! Registration order matters and is part of the contract:
//! pulse -> schema -> memory -> visual. Schema reads the pulse heat
//! written earlier in the same tick; memory and visual read schema's
//! coherence and mood.
//!
//! # Modules
//!
//! - [`noise`] -- Gaussian noise helper shared by the subsystems.
//! - [`pulse`] -- Thermal oscillator with a private display zone.
//! - [`schema`] -- Coherence/mood pair with stochastic mood switching.
//! - [`memory`] -- Probabilistic memory formation over a bounded buffer.
//! - [`visual`] -- Display pattern selection for external renderers.

pub mod memory;
pub mod noise;
pub mod pulse;
pub mod schema;
pub mod visual;

pub use memory::MemorySubsystem;
pub use pulse::PulseSubsystem;
pub use schema::SchemaSubsystem;
pub use visual::VisualSubsystem;
