//! Shared type definitions for the Reverie simulation core.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the Reverie workspace: operating zones, moods, the per-tick shared
//! context, subsystem reports, and the per-tick summary record.
//!
//! # Modules
//!
//! - [`enums`] -- Enumeration types (zone, mood, pulse zone, report status)
//! - [`structs`] -- Core data structs (tick context, reports, summaries)

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Mood, PulseZone, ReportStatus, Zone};
pub use structs::{PulseState, SubsystemReport, TickContext, TickSummary};
