//! Stage-game payoff model.
//!
//! The payoff for a signaller depends on four things: their own type, the
//! responder's type, the signal they sent, and the response they received.
//! The payoff for a responder depends only on the signaller's true type and
//! the response chosen. Both tensors are built once from nine named
//! parameters and are read-only afterwards.
//!
//! # Outcome structure
//!
//! - Referral always yields the healthy outcome (`baby_payoff`); the
//!   responder additionally pays `referral_cost`.
//! - No action yields the healthy outcome for a low type, the
//!   `mid_baby_payoff` loss for a middle type, and the `no_baby_payoff` loss
//!   for a high type.
//! - The signaller always pays a social cost for the signal sent: the
//!   signal's base cost (light/moderate/heavy) times the responder's
//!   judgement multiplier (1 for low, `moderate_judge_multiplier` for
//!   middle, `harsh_judge_multiplier` for high).

use serde::{Deserialize, Serialize};
use signalling_types::{PerResponse, PerSignal, PerType, PlayerType, Response, Signal};

/// Errors that can occur while building a payoff model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayoffError {
    /// A parameter was NaN or infinite.
    #[error("payoff parameter {name} must be finite (got {value})")]
    NonFinite {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Named cost and benefit parameters for the stage game.
///
/// Outcome magnitudes (`no_baby_payoff`, `mid_baby_payoff`) are given as
/// positive numbers and enter the tensors negated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffParams {
    /// Value of the healthy outcome (default 0).
    pub baby_payoff: f64,
    /// Magnitude of the worst outcome (default 100).
    pub no_baby_payoff: f64,
    /// Magnitude of the intermediate outcome (default 50).
    pub mid_baby_payoff: f64,
    /// Cost a responder pays for referring (default 50).
    pub referral_cost: f64,
    /// Base social cost of signalling heavy drinking (default 3).
    pub heavy_cost: f64,
    /// Base social cost of signalling moderate drinking (default 2).
    pub moderate_cost: f64,
    /// Base social cost of signalling light drinking (default 1).
    pub light_cost: f64,
    /// Social cost multiplier for a middle-type responder (default 2).
    pub moderate_judge_multiplier: f64,
    /// Social cost multiplier for a high-type responder (default 3).
    pub harsh_judge_multiplier: f64,
}

impl Default for PayoffParams {
    fn default() -> Self {
        Self {
            baby_payoff: 0.0,
            no_baby_payoff: 100.0,
            mid_baby_payoff: 50.0,
            referral_cost: 50.0,
            heavy_cost: 3.0,
            moderate_cost: 2.0,
            light_cost: 1.0,
            moderate_judge_multiplier: 2.0,
            harsh_judge_multiplier: 3.0,
        }
    }
}

impl PayoffParams {
    /// Check that every parameter is a finite number.
    pub fn validate(&self) -> Result<(), PayoffError> {
        let named = [
            ("baby_payoff", self.baby_payoff),
            ("no_baby_payoff", self.no_baby_payoff),
            ("mid_baby_payoff", self.mid_baby_payoff),
            ("referral_cost", self.referral_cost),
            ("heavy_cost", self.heavy_cost),
            ("moderate_cost", self.moderate_cost),
            ("light_cost", self.light_cost),
            ("moderate_judge_multiplier", self.moderate_judge_multiplier),
            ("harsh_judge_multiplier", self.harsh_judge_multiplier),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(PayoffError::NonFinite { name, value });
            }
        }
        Ok(())
    }

    /// Base social cost of sending `signal`.
    const fn signal_cost(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Light => self.light_cost,
            Signal::Moderate => self.moderate_cost,
            Signal::Heavy => self.heavy_cost,
        }
    }

    /// Judgement multiplier of a responder of `responder_type`.
    const fn judge_multiplier(&self, responder_type: PlayerType) -> f64 {
        match responder_type {
            PlayerType::Low => 1.0,
            PlayerType::Middle => self.moderate_judge_multiplier,
            PlayerType::High => self.harsh_judge_multiplier,
        }
    }

    /// Outcome value when no action is taken for a signaller of `player_type`.
    fn untreated_outcome(&self, player_type: PlayerType) -> f64 {
        match player_type {
            PlayerType::Low => self.baby_payoff,
            PlayerType::Middle => -self.mid_baby_payoff,
            PlayerType::High => -self.no_baby_payoff,
        }
    }

    /// Outcome value given the signaller's type and the response.
    fn outcome(&self, player_type: PlayerType, response: Response) -> f64 {
        match response {
            Response::NoAction => self.untreated_outcome(player_type),
            Response::Refer => self.baby_payoff,
        }
    }
}

// ---------------------------------------------------------------------------
// PayoffModel
// ---------------------------------------------------------------------------

/// One signaller type's payoffs, indexed `[responder type][signal][response]`.
pub type SignallerTable = PerType<PerSignal<PerResponse<f64>>>;

/// Responder payoffs, indexed `[signaller type][response]`.
pub type ResponderTable = PerType<PerResponse<f64>>;

/// A payoff reachable by a signaller for a fixed signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReachablePayoff {
    /// The responder type that produces this payoff.
    pub responder_type: PlayerType,
    /// The response that produces this payoff.
    pub response: Response,
    /// The payoff value.
    pub payoff: f64,
}

/// The deterministic payoff tensors of the stage game.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffModel {
    params: PayoffParams,
    signaller: PerType<SignallerTable>,
    responder: ResponderTable,
}

impl PayoffModel {
    /// Build both payoff tensors from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`PayoffError::NonFinite`] if any parameter is NaN or infinite.
    pub fn build(params: PayoffParams) -> Result<Self, PayoffError> {
        params.validate()?;

        let responder = PerType::from_fn(|signaller_type| {
            PerResponse::from_fn(|response| {
                let outcome = params.outcome(signaller_type, response);
                match response {
                    Response::NoAction => outcome,
                    Response::Refer => outcome - params.referral_cost,
                }
            })
        });

        let signaller = PerType::from_fn(|own_type| {
            PerType::from_fn(|responder_type| {
                PerSignal::from_fn(|signal| {
                    let social_cost =
                        params.signal_cost(signal) * params.judge_multiplier(responder_type);
                    PerResponse::from_fn(|response| params.outcome(own_type, response) - social_cost)
                })
            })
        });

        Ok(Self {
            params,
            signaller,
            responder,
        })
    }

    /// The parameters this model was built from.
    pub const fn params(&self) -> &PayoffParams {
        &self.params
    }

    /// Payoff to a signaller of `own_type` who sent `signal` to a responder
    /// of `responder_type` and received `response`.
    pub fn signaller_payoff(
        &self,
        own_type: PlayerType,
        responder_type: PlayerType,
        signal: Signal,
        response: Response,
    ) -> f64 {
        *self
            .signaller
            .get(own_type)
            .get(responder_type)
            .get(signal)
            .get(response)
    }

    /// Payoff to a responder who chose `response` for a signaller of
    /// `signaller_type`.
    pub fn responder_payoff(&self, signaller_type: PlayerType, response: Response) -> f64 {
        *self.responder.get(signaller_type).get(response)
    }

    /// The worst payoff a responder can receive against `signaller_type`,
    /// whatever it responds.
    pub fn responder_worst_payoff(&self, signaller_type: PlayerType) -> f64 {
        Response::ALL
            .iter()
            .map(|&response| self.responder_payoff(signaller_type, response))
            .fold(f64::INFINITY, f64::min)
    }

    /// The payoff table seen by a signaller of `own_type`.
    pub const fn signaller_table(&self, own_type: PlayerType) -> &SignallerTable {
        self.signaller.get(own_type)
    }

    /// The responder payoff table.
    pub const fn responder_table(&self) -> &ResponderTable {
        &self.responder
    }

    /// Every payoff a signaller of `own_type` can receive after sending
    /// `signal`, one per (responder type, response) pair.
    pub fn reachable_payoffs(&self, own_type: PlayerType, signal: Signal) -> Vec<ReachablePayoff> {
        let table = self.signaller_table(own_type);
        PlayerType::ALL
            .iter()
            .flat_map(|&responder_type| {
                Response::ALL.iter().map(move |&response| ReachablePayoff {
                    responder_type,
                    response,
                    payoff: *table.get(responder_type).get(signal).get(response),
                })
            })
            .collect()
    }
}
