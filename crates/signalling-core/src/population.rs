//! Population construction.
//!
//! Signallers and responders are drawn with types sampled from a weighted
//! distribution. Signallers additionally start from a random belief about
//! how responder types are distributed, which [`random_type_weights`]
//! draws.

use rand::Rng;
use serde::{Deserialize, Serialize};
use signalling_agents::{Agent, AgentError, DecisionRule, TieBreak};
use signalling_types::{AgentId, PerType, PlayerType};

/// Errors raised while building a population.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PopulationError {
    /// A type weight was negative, NaN, or infinite.
    #[error("weight for {player_type} must be finite and non-negative (got {value})")]
    InvalidWeight {
        /// The type with the bad weight.
        player_type: PlayerType,
        /// The rejected weight.
        value: f64,
    },

    /// All weights were zero.
    #[error("type weights sum to zero")]
    ZeroTotalWeight,

    /// An agent could not be created.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// How one side of the game is populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    /// Number of agents.
    pub size: usize,
    /// Relative frequency of each type.
    pub weights: PerType<f64>,
    /// Decision rule every member uses.
    pub rule: DecisionRule,
    /// Tie-break policy every member uses.
    pub tie_break: TieBreak,
}

/// Check that `weights` can be sampled from and return their total.
pub fn validate_weights(weights: &PerType<f64>) -> Result<f64, PopulationError> {
    for (player_type, &value) in weights.iter() {
        if !value.is_finite() || value < 0.0 {
            return Err(PopulationError::InvalidWeight { player_type, value });
        }
    }
    let total = weights.total();
    if total > 0.0 {
        Ok(total)
    } else {
        Err(PopulationError::ZeroTotalWeight)
    }
}

/// Pick a type with probability proportional to its weight.
///
/// # Errors
///
/// Fails if any weight is negative or non-finite, or if all are zero.
pub fn weighted_choice<R: Rng + ?Sized>(
    weights: &PerType<f64>,
    rng: &mut R,
) -> Result<PlayerType, PopulationError> {
    let total = validate_weights(weights)?;
    let target = rng.random::<f64>() * total;
    let mut upto = 0.0;
    let mut last_positive = PlayerType::Low;
    for (player_type, &weight) in weights.iter() {
        if weight <= 0.0 {
            continue;
        }
        if upto + weight > target {
            return Ok(player_type);
        }
        upto += weight;
        last_positive = player_type;
    }
    // Rounding can leave `target` a hair above the running total.
    Ok(last_positive)
}

/// A random prior over responder types.
///
/// Two uniform draws on `[0.01, 1.01)` are sorted together with the
/// endpoints 0.01 and 1.01; the three consecutive gaps are the weights, so
/// they are non-negative and sum to one.
pub fn random_type_weights<R: Rng + ?Sized>(rng: &mut R) -> PerType<f64> {
    let a: f64 = rng.random_range(0.01..1.01);
    let b: f64 = rng.random_range(0.01..1.01);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    PerType {
        low: lo - 0.01,
        middle: hi - lo,
        high: 1.01 - hi,
    }
}

/// Create `cohort.size` signallers that each play `rounds` rounds.
///
/// # Errors
///
/// Fails on invalid weights or an invalid decision rule.
pub fn make_signallers<R: Rng + ?Sized>(
    cohort: &Cohort,
    rounds: u32,
    rng: &mut R,
) -> Result<Vec<Agent>, PopulationError> {
    (0..cohort.size)
        .map(|_| {
            let player_type = weighted_choice(&cohort.weights, rng)?;
            let agent = Agent::signaller(AgentId::from_rng(rng), player_type, cohort.rule, rounds)?;
            Ok(agent.with_tie_break(cohort.tie_break))
        })
        .collect()
}

/// Create `cohort.size` responders.
///
/// # Errors
///
/// Fails on invalid weights or an invalid decision rule.
pub fn make_responders<R: Rng + ?Sized>(
    cohort: &Cohort,
    rng: &mut R,
) -> Result<Vec<Agent>, PopulationError> {
    (0..cohort.size)
        .map(|_| {
            let player_type = weighted_choice(&cohort.weights, rng)?;
            let agent = Agent::responder(AgentId::from_rng(rng), player_type, cohort.rule)?;
            Ok(agent.with_tie_break(cohort.tie_break))
        })
        .collect()
}
