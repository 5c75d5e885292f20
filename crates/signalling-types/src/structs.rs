//! Records produced by play and read by reporting.
//!
//! [`RoundRecord`] is the immutable trace of one round between a signaller
//! and a responder. [`AgentSummary`] is a flattened, serialisable snapshot
//! of an agent at the end of a run.

use serde::{Deserialize, Serialize};

use crate::enums::{PlayerType, Response, Role, Signal};
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// RoundRecord
// ---------------------------------------------------------------------------

/// Everything that happened in a single round of the stage game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// The signaller's identifier.
    pub signaller_id: AgentId,
    /// The responder's identifier.
    pub responder_id: AgentId,
    /// The signaller's true type.
    pub signaller_type: PlayerType,
    /// The responder's type.
    pub responder_type: PlayerType,
    /// The signaller's round index (0-based) when this round was played.
    pub signaller_round: u32,
    /// The signal sent.
    pub signal: Signal,
    /// The response chosen.
    pub response: Response,
    /// Payoff realised by the signaller.
    pub signaller_payoff: f64,
    /// Payoff realised by the responder.
    pub responder_payoff: f64,
    /// Whether the signal named the signaller's true type.
    pub truthful: bool,
}

// ---------------------------------------------------------------------------
// AgentSummary
// ---------------------------------------------------------------------------

/// One entry of an agent's current belief state.
///
/// `outcome` is the payoff value for signallers and the type ordinal for
/// responders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefPoint {
    /// The signal the belief is conditioned on.
    pub signal: Signal,
    /// The outcome key.
    pub outcome: f64,
    /// Current posterior-mean probability.
    pub probability: f64,
}

/// End-of-run snapshot of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    /// The agent's identifier.
    pub id: AgentId,
    /// Which side of the game the agent played.
    pub role: Role,
    /// The agent's type.
    pub player_type: PlayerType,
    /// Rounds played.
    pub rounds: u32,
    /// Whether the agent completed its configured number of rounds.
    pub finished: bool,
    /// Sum of realised payoffs.
    pub total_payoff: f64,
    /// Fraction of rounds in which the agent's signal (signallers) or the
    /// received signal (responders) was truthful. `None` when no signal was
    /// attributable.
    pub truthful_fraction: Option<f64>,
    /// Current beliefs, flattened.
    pub beliefs: Vec<BeliefPoint>,
}
