//! Sigil lifecycle arena for the Reverie simulation core.
//!
//! Sigils are short-lived symbolic tokens with heat, entropy, and a
//! decaying lifespan; they represent transient "active" state in the
//! reflective loop. Because sigils are created and destroyed at high
//! turnover, they live in a flat arena (slot vector plus free list, with
//! a by-id index) rather than as scattered heap objects, so the per-tick
//! aging pass is a single linear sweep.
//!
//! The decay model is deliberately coupled: each sigil's decay rate is
//! multiplied by a factor derived from the *aggregate* entropy of every
//! alive sigil, so a crowded, hot registry accelerates everyone's decay.
//! This acts as an anti-overload pressure valve on symbolic load.
//!
//! # Modules
//!
//! - [`sigil`] -- The [`Sigil`] record, [`SigilPriority`], and
//!   [`SigilConfig`] tuning knobs.
//! - [`registry`] -- The [`SigilRegistry`] arena and its lifecycle
//!   operations.
//!
//! [`Sigil`]: sigil::Sigil
//! [`SigilPriority`]: sigil::SigilPriority
//! [`SigilConfig`]: sigil::SigilConfig
//! [`SigilRegistry`]: registry::SigilRegistry

pub mod registry;
pub mod sigil;

pub use registry::SigilRegistry;
pub use sigil::{Sigil, SigilConfig, SigilPriority};
