//! Orchestration for the signalling game simulation.
//!
//! This crate turns individual agents into experiments: it plays rounds,
//! pairs populations, measures what they learned, and reads the YAML
//! configuration that ties a run together.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `signalling-config.yaml` into
//!   strongly-typed structs.
//! - [`game`] -- The [`Game`] that plays rounds and keeps the interaction
//!   logs.
//! - [`population`] -- Weighted type sampling and cohort construction.
//! - [`matching`] -- The [`Matching`] trait and the random, caseload and
//!   equal-rounds policies.
//! - [`measures`] -- Per-round population measures.
//! - [`experiment`] -- Single runs and side-by-side rule comparisons.
//!
//! [`Game`]: game::Game
//! [`Matching`]: matching::Matching

pub mod config;
pub mod experiment;
pub mod game;
pub mod matching;
pub mod measures;
pub mod population;

pub use config::{ConfigError, SimulationConfig};
pub use experiment::{ExperimentError, ExperimentReport, compare_decision_rules, run_experiment};
pub use game::{Game, GameError, Priors, SignallerPriors};
pub use matching::{Matching, MatchingError, MatchingPolicy};
pub use measures::Measures;
