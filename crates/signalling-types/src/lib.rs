//! Shared type definitions for the signalling game simulation.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the workspace: who the players are, what they can say and do, and the
//! records a round of play leaves behind.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for agent identifiers
//! - [`enums`] -- Player types, signals, responses, and roles
//! - [`tables`] -- Fixed-size tables keyed by the enumerations above
//! - [`structs`] -- Round records and agent summaries

pub mod enums;
pub mod ids;
pub mod structs;
pub mod tables;

// Re-export all public types at crate root for convenience.
pub use enums::{PlayerType, Response, Role, Signal};
pub use ids::AgentId;
pub use structs::{AgentSummary, BeliefPoint, RoundRecord};
pub use tables::{PerResponse, PerSignal, PerType};
