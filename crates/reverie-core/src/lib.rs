//! Tick scheduler, subsystems, SCUP scoring, and reflective loop for the
//! Reverie simulation core.
//!
//! This crate owns the per-tick cycle that drives the simulation: advance
//! the clock, run each registered subsystem in order against the shared
//! tick context, age the sigil registry, fold the results into a
//! composite coherence score (SCUP), classify the operating zone, step
//! the reflective pause loop, and publish a summary event.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter with checked advancement.
//! - [`config`] -- Configuration loading from `reverie-config.yaml` into
//!   strongly-typed structs.
//! - [`scup`] -- Pure SCUP computation and zone classification.
//! - [`subsystem`] -- The [`Subsystem`] contract and its error type.
//! - [`subsystems`] -- The four concrete subsystems (pulse, schema,
//!   memory, visual).
//! - [`reflect`] -- The reflective pause/cooldown loop and the
//!   [`SigilInvoker`] contract.
//! - [`scheduler`] -- The one-tick orchestration engine.
//! - [`runner`] -- Bounded simulation loop with per-tick callbacks.
//!
//! [`Subsystem`]: subsystem::Subsystem
//! [`SigilInvoker`]: reflect::SigilInvoker

pub mod clock;
pub mod config;
pub mod reflect;
pub mod runner;
pub mod scheduler;
pub mod scup;
pub mod subsystem;
pub mod subsystems;
