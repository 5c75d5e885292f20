//! Belief and decision engine for the signalling game.
//!
//! Everything an individual player needs lives here: the stage-game payoff
//! model, the online belief estimator, the decision rules that turn beliefs
//! into actions, and the [`Agent`] type that ties them together.
//!
//! # Modules
//!
//! - [`payoff`] -- Payoff parameters and the signaller/responder tensors
//! - [`beliefs`] -- Dirichlet posterior-mean belief store with full history
//! - [`weighting`] -- Tversky-Kahneman and Prelec probability weighting
//! - [`valuation`] -- Cumulative prospect theory value and decision weights
//! - [`decision`] -- Bayesian, prospect theory, CPT and minimax rules
//! - [`agent`] -- Agent lifecycle, logs and belief updates
//! - [`error`] -- Error types for all of the above

pub mod agent;
pub mod beliefs;
pub mod decision;
pub mod error;
pub mod payoff;
pub mod valuation;
pub mod weighting;

pub use agent::{Agent, BeliefKey, Lifecycle, RoundOutcome};
pub use beliefs::{BeliefError, BeliefStore, posterior_mean};
pub use decision::{Candidate, Choice, DecisionRule, ProspectTheory, ReferenceMode, TieBreak};
pub use error::{AgentError, RuleError};
pub use payoff::{PayoffError, PayoffModel, PayoffParams, ReachablePayoff};
pub use valuation::{CptParams, Prospect};
pub use weighting::ProbabilityWeighting;
