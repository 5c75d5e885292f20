//! Stage-game orchestration.
//!
//! A [`Game`] owns the shared payoff model and the round-by-round record of
//! every interaction played through it. Agents are borrowed for each round
//! and never stored.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use signalling_agents::{Agent, AgentError, PayoffError, PayoffModel, PayoffParams, RoundOutcome};
use signalling_types::{PerSignal, PerType, Response, Role, RoundRecord, Signal};
use tracing::debug;

use crate::population::random_type_weights;

/// Errors raised while playing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// The payoff model could not be built.
    #[error("payoff error: {source}")]
    Payoff {
        /// The underlying payoff error.
        #[from]
        source: PayoffError,
    },

    /// An agent rejected an operation.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Where a signaller's prior over responder types comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignallerPriors {
    /// A fresh draw from [`random_type_weights`] per signaller.
    #[default]
    Random,
    /// The same weights for every signaller.
    Fixed {
        /// Prior weight of each responder type.
        weights: PerType<f64>,
    },
}

/// Prior beliefs handed to agents the first time they play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    /// Signaller prior over responder types.
    #[serde(default)]
    pub signaller: SignallerPriors,
    /// Responder prior weight of each signaller type, per signal.
    #[serde(default = "uniform_responder_priors")]
    pub responder: PerSignal<PerType<f64>>,
}

/// Uniform responder priors: weight 1/3 on every type for every signal.
pub fn uniform_responder_priors() -> PerSignal<PerType<f64>> {
    PerSignal::uniform(PerType::uniform(1.0 / 3.0))
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            signaller: SignallerPriors::default(),
            responder: uniform_responder_priors(),
        }
    }
}

/// A repeated game between signallers and responders over one payoff model.
#[derive(Debug, Clone)]
pub struct Game {
    payoffs: Arc<PayoffModel>,
    rounds_per_game: u32,
    priors: Priors,
    signal_log: Vec<Signal>,
    response_log: Vec<Response>,
    truthful_log: Vec<bool>,
    records: Vec<RoundRecord>,
}

impl Game {
    /// Build the payoff model from `params` and create a game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Payoff`] for non-finite parameters.
    pub fn new(params: PayoffParams, rounds_per_game: u32, priors: Priors) -> Result<Self, GameError> {
        let payoffs = Arc::new(PayoffModel::build(params)?);
        Ok(Self::with_model(payoffs, rounds_per_game, priors))
    }

    /// Create a game over an existing payoff model.
    ///
    /// A game always plays at least one round per pairing.
    pub const fn with_model(payoffs: Arc<PayoffModel>, rounds_per_game: u32, priors: Priors) -> Self {
        Self {
            payoffs,
            rounds_per_game: if rounds_per_game == 0 { 1 } else { rounds_per_game },
            priors,
            signal_log: Vec::new(),
            response_log: Vec::new(),
            truthful_log: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Initialise both agents with this game's payoffs and priors.
    ///
    /// Agents that are already initialised are left alone and no random
    /// prior is drawn for them.
    pub fn prepare<R: Rng + ?Sized>(
        &self,
        signaller: &mut Agent,
        responder: &mut Agent,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if signaller.payoffs().is_none() {
            let weights = match self.priors.signaller {
                SignallerPriors::Random => random_type_weights(rng),
                SignallerPriors::Fixed { weights } => weights,
            };
            signaller.init_signaller(Arc::clone(&self.payoffs), &weights)?;
        }
        responder.init_responder(Arc::clone(&self.payoffs), &self.priors.responder)?;
        Ok(())
    }

    /// Play one round.
    ///
    /// The signaller signals from its own beliefs, the responder sees only
    /// the signal, both payoffs are read off the true types, and both agents
    /// update their beliefs before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Agent`] if either agent is uninitialised,
    /// finished, or in the wrong role. Both agents are checked before
    /// either acts, so a rejected round leaves them untouched.
    pub fn play_round<R: Rng + ?Sized>(
        &mut self,
        signaller: &mut Agent,
        responder: &mut Agent,
        rng: &mut R,
    ) -> Result<RoundRecord, GameError> {
        signaller.ensure_ready(Role::Signaller)?;
        responder.ensure_ready(Role::Responder)?;

        let signaller_round = signaller.rounds();
        let signal = signaller.signal(rng)?;
        let response = responder.respond(signal, rng)?;

        let signaller_type = signaller.player_type();
        let responder_type = responder.player_type();
        let signaller_payoff =
            self.payoffs
                .signaller_payoff(signaller_type, responder_type, signal, response);
        let responder_payoff = self.payoffs.responder_payoff(signaller_type, response);

        signaller.update_beliefs(RoundOutcome {
            payoff: signaller_payoff,
            opponent_type: responder_type,
            response,
        })?;
        responder.update_beliefs(RoundOutcome {
            payoff: responder_payoff,
            opponent_type: signaller_type,
            response,
        })?;

        let truthful = signal.is_truthful_for(signaller_type);
        debug!(
            signaller = %signaller.id(),
            responder = %responder.id(),
            round = signaller_round,
            %signal,
            %response,
            truthful,
            "Round played"
        );

        let record = RoundRecord {
            signaller_id: signaller.id(),
            responder_id: responder.id(),
            signaller_type,
            responder_type,
            signaller_round,
            signal,
            response,
            signaller_payoff,
            responder_payoff,
            truthful,
        };
        self.signal_log.push(signal);
        self.response_log.push(response);
        self.truthful_log.push(truthful);
        self.records.push(record.clone());
        Ok(record)
    }

    /// Initialise both agents if needed, then play up to `rounds_per_game`
    /// rounds, stopping early once the signaller has finished.
    ///
    /// # Errors
    ///
    /// Propagates initialisation and round errors.
    pub fn play_game<R: Rng + ?Sized>(
        &mut self,
        signaller: &mut Agent,
        responder: &mut Agent,
        rng: &mut R,
    ) -> Result<(), GameError> {
        self.play_rounds(signaller, responder, self.rounds_per_game, rng)
    }

    /// Like [`Game::play_game`], but for an explicit number of rounds.
    ///
    /// # Errors
    ///
    /// Propagates initialisation and round errors.
    pub fn play_rounds<R: Rng + ?Sized>(
        &mut self,
        signaller: &mut Agent,
        responder: &mut Agent,
        rounds: u32,
        rng: &mut R,
    ) -> Result<(), GameError> {
        self.prepare(signaller, responder, rng)?;
        for _ in 0..rounds {
            if signaller.is_finished() {
                break;
            }
            self.play_round(signaller, responder, rng)?;
        }
        Ok(())
    }

    /// The shared payoff model.
    pub const fn payoffs(&self) -> &Arc<PayoffModel> {
        &self.payoffs
    }

    /// Rounds played per call to [`Game::play_game`].
    pub const fn rounds_per_game(&self) -> u32 {
        self.rounds_per_game
    }

    /// Priors handed to agents on their first game.
    pub const fn priors(&self) -> &Priors {
        &self.priors
    }

    /// Every signal sent through this game, in play order.
    pub fn signal_log(&self) -> &[Signal] {
        &self.signal_log
    }

    /// Every response chosen through this game, in play order.
    pub fn response_log(&self) -> &[Response] {
        &self.response_log
    }

    /// Whether each signal named its sender's true type, in play order.
    pub fn truthful_log(&self) -> &[bool] {
        &self.truthful_log
    }

    /// Full records of every round, in play order.
    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    /// Total rounds played through this game.
    pub fn rounds_played(&self) -> usize {
        self.records.len()
    }
}
