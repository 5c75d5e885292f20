//! Error types for the signalling-agents crate.
//!
//! Configuration problems (bad rule parameters, bad priors, bad payoff
//! parameters) fail fast with typed errors. Operations on an agent that
//! break its lifecycle (deciding twice, updating without a decision,
//! acting in the wrong role) are reported as [`AgentError`] rather than
//! panicking.

use signalling_types::{AgentId, Role};

use crate::beliefs::BeliefError;
use crate::payoff::PayoffError;

/// Errors in decision-rule parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// A parameter was outside its admissible range.
    #[error("rule parameter {name} is invalid: {value} ({requirement})")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// What the parameter must satisfy.
        requirement: &'static str,
    },
}

impl RuleError {
    /// Accept `value` only if it is finite and strictly positive.
    pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidParameter {
                name,
                value,
                requirement: "finite and > 0",
            })
        }
    }

    /// Accept `value` only if it is finite.
    pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<(), Self> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Self::InvalidParameter {
                name,
                value,
                requirement: "finite",
            })
        }
    }
}

/// Errors that can occur during agent operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// The operation belongs to the other role.
    #[error("agent {agent_id} is a {actual}, operation requires a {expected}")]
    WrongRole {
        /// The agent.
        agent_id: AgentId,
        /// Role the operation needs.
        expected: Role,
        /// Role the agent has.
        actual: Role,
    },

    /// The agent has not been given payoffs and priors yet.
    #[error("agent {0} has not been initialised with payoffs")]
    NotInitialised(AgentId),

    /// A decision was requested while the previous one is still unresolved.
    #[error("agent {0} is still waiting for the outcome of its last decision")]
    OutcomePending(AgentId),

    /// An outcome was delivered without a preceding decision.
    #[error("agent {0} has no decision awaiting an outcome")]
    NoPendingDecision(AgentId),

    /// The agent has completed its configured number of rounds.
    #[error("agent {0} has finished playing")]
    Finished(AgentId),

    /// A round counter would overflow.
    #[error("round counter overflow for agent {0}")]
    RoundOverflow(AgentId),

    /// Belief construction or update failed.
    #[error("belief error: {source}")]
    Belief {
        /// The underlying belief error.
        #[from]
        source: BeliefError,
    },

    /// Payoff model construction failed.
    #[error("payoff error: {source}")]
    Payoff {
        /// The underlying payoff error.
        #[from]
        source: PayoffError,
    },

    /// A decision rule was misconfigured.
    #[error("rule error: {source}")]
    Rule {
        /// The underlying rule error.
        #[from]
        source: RuleError,
    },
}
