//! Agents: one type for both sides of the game.
//!
//! An [`Agent`] couples a fixed [`PlayerType`] with a [`DecisionRule`], a
//! belief store and append-only logs. Signallers believe in payoffs given
//! the signal they send; responders believe in signaller types given the
//! signal they receive. Which of the two an agent holds is fixed by its
//! [`Role`].
//!
//! # Lifecycle
//!
//! ```text
//! Created --init--> Ready --signal/respond--> AwaitingOutcome --update--> Ready
//!                                                               \-------> Finished
//! ```
//!
//! Initialisation is idempotent: a second `init_*` call leaves the payoff
//! model and priors untouched. A signaller becomes `Finished` once it has
//! played its target number of rounds; responders play until the caller
//! stops pairing them.

use std::collections::BTreeMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use signalling_types::{
    AgentId, AgentSummary, BeliefPoint, PerSignal, PerType, PlayerType, Response, Role, Signal,
};

use crate::beliefs::BeliefStore;
use crate::decision::{Candidate, DecisionRule, TieBreak};
use crate::error::AgentError;
use crate::payoff::PayoffModel;
use crate::valuation::Prospect;

/// Where an agent is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Constructed, no payoffs or priors yet.
    Created,
    /// Able to make its next decision.
    Ready,
    /// Decided this round; waiting for the realised outcome.
    AwaitingOutcome,
    /// Played its target number of rounds.
    Finished,
}

/// What an agent learns at the end of a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Payoff the agent realised.
    pub payoff: f64,
    /// True type of the other party.
    pub opponent_type: PlayerType,
    /// Response chosen this round.
    pub response: Response,
}

/// Key into an agent's belief history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeliefKey {
    /// A payoff value (signallers).
    Payoff(f64),
    /// A signaller type (responders).
    Type(PlayerType),
}

#[derive(Debug, Clone, PartialEq)]
enum Beliefs {
    Payoffs(BeliefStore<OrderedFloat<f64>>),
    Types(BeliefStore<PlayerType>),
}

#[derive(Debug, Clone, PartialEq)]
struct Knowledge {
    payoffs: Arc<PayoffModel>,
    beliefs: Beliefs,
}

/// A player in the signalling game.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    role: Role,
    player_type: PlayerType,
    rule: DecisionRule,
    tie_break: TieBreak,
    target_rounds: Option<u32>,
    knowledge: Option<Knowledge>,
    state: Lifecycle,
    rounds: u32,
    /// Signals sent (signallers) or received (responders).
    signal_log: Vec<Signal>,
    /// Responses received (signallers) or chosen (responders).
    response_log: Vec<Response>,
    payoff_log: Vec<f64>,
    /// Signaller types met; responders only.
    opponent_type_log: Vec<PlayerType>,
}

impl Agent {
    /// Create a signaller that finishes after `target_rounds` rounds.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Rule`] if the rule's parameters are invalid.
    pub fn signaller(
        id: AgentId,
        player_type: PlayerType,
        rule: DecisionRule,
        target_rounds: u32,
    ) -> Result<Self, AgentError> {
        Self::new(id, Role::Signaller, player_type, rule, Some(target_rounds))
    }

    /// Create a responder.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Rule`] if the rule's parameters are invalid.
    pub fn responder(
        id: AgentId,
        player_type: PlayerType,
        rule: DecisionRule,
    ) -> Result<Self, AgentError> {
        Self::new(id, Role::Responder, player_type, rule, None)
    }

    fn new(
        id: AgentId,
        role: Role,
        player_type: PlayerType,
        rule: DecisionRule,
        target_rounds: Option<u32>,
    ) -> Result<Self, AgentError> {
        rule.validate()?;
        Ok(Self {
            id,
            role,
            player_type,
            rule,
            tie_break: TieBreak::default(),
            target_rounds,
            knowledge: None,
            state: Lifecycle::Created,
            rounds: 0,
            signal_log: Vec::new(),
            response_log: Vec::new(),
            payoff_log: Vec::new(),
            opponent_type_log: Vec::new(),
        })
    }

    /// Use `tie_break` to separate equally scored actions.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    // -----------------------------------------------------------------------
    // Initialisation
    // -----------------------------------------------------------------------

    /// Give a signaller its payoffs and prior beliefs.
    ///
    /// For every signal, each reachable payoff receives prior weight
    /// `type_weights[r] / 2` for every (responder type `r`, response) pair
    /// producing it. Does nothing if the agent is already initialised.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::WrongRole`] for a responder and
    /// [`AgentError::Belief`] if the weights are negative, non-finite or
    /// all zero.
    pub fn init_signaller(
        &mut self,
        payoffs: Arc<PayoffModel>,
        type_weights: &PerType<f64>,
    ) -> Result<(), AgentError> {
        self.require_role(Role::Signaller)?;
        if self.knowledge.is_some() {
            return Ok(());
        }
        let priors = PerSignal::from_fn(|signal| {
            let mut alphas: BTreeMap<OrderedFloat<f64>, f64> = BTreeMap::new();
            for reachable in payoffs.reachable_payoffs(self.player_type, signal) {
                *alphas.entry(OrderedFloat(reachable.payoff)).or_insert(0.0) +=
                    type_weights.get(reachable.responder_type) / 2.0;
            }
            alphas
        });
        let beliefs = Beliefs::Payoffs(BeliefStore::new(priors)?);
        self.install(payoffs, beliefs);
        Ok(())
    }

    /// Give a responder its payoffs and per-signal prior type weights.
    ///
    /// Does nothing if the agent is already initialised.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::WrongRole`] for a signaller and
    /// [`AgentError::Belief`] for invalid prior weights.
    pub fn init_responder(
        &mut self,
        payoffs: Arc<PayoffModel>,
        priors: &PerSignal<PerType<f64>>,
    ) -> Result<(), AgentError> {
        self.require_role(Role::Responder)?;
        if self.knowledge.is_some() {
            return Ok(());
        }
        let priors = priors.map(|weights| {
            weights
                .iter()
                .map(|(player_type, &alpha)| (player_type, alpha))
                .collect::<BTreeMap<PlayerType, f64>>()
        });
        let beliefs = Beliefs::Types(BeliefStore::new(priors)?);
        self.install(payoffs, beliefs);
        Ok(())
    }

    fn install(&mut self, payoffs: Arc<PayoffModel>, beliefs: Beliefs) {
        self.knowledge = Some(Knowledge { payoffs, beliefs });
        self.state = if self.target_reached() {
            Lifecycle::Finished
        } else {
            Lifecycle::Ready
        };
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    /// Choose a signal from current payoff beliefs.
    ///
    /// # Errors
    ///
    /// Fails if the agent is not a signaller, is not initialised, is still
    /// waiting for last round's outcome, or has finished.
    pub fn signal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Signal, AgentError> {
        self.require_role(Role::Signaller)?;
        self.require_ready()?;
        let Some(Beliefs::Payoffs(store)) = self.knowledge.as_ref().map(|k| &k.beliefs) else {
            return Err(AgentError::NotInitialised(self.id));
        };

        let candidates: Vec<Candidate<Signal>> = Signal::ALL
            .iter()
            .map(|&signal| Candidate {
                action: signal,
                prospects: store
                    .current(signal)
                    .into_iter()
                    .map(|(payoff, p)| Prospect::new(payoff.into_inner(), p))
                    .collect(),
            })
            .collect();
        let signal = self
            .rule
            .choose(&candidates, &self.payoff_log, self.tie_break, rng)
            .map_or(Signal::Light, |choice| choice.action);

        let rounds = self.next_round()?;
        self.signal_log.push(signal);
        self.rounds = rounds;
        self.state = Lifecycle::AwaitingOutcome;
        Ok(signal)
    }

    /// Observe `signal` and choose a response from current type beliefs.
    ///
    /// # Errors
    ///
    /// Fails if the agent is not a responder, is not initialised, or is
    /// still waiting for last round's outcome.
    pub fn respond<R: Rng + ?Sized>(
        &mut self,
        signal: Signal,
        rng: &mut R,
    ) -> Result<Response, AgentError> {
        self.require_role(Role::Responder)?;
        self.require_ready()?;
        let Some(Knowledge {
            payoffs,
            beliefs: Beliefs::Types(store),
        }) = self.knowledge.as_ref()
        else {
            return Err(AgentError::NotInitialised(self.id));
        };

        let belief = store.current(signal);
        let candidates: Vec<Candidate<Response>> = Response::ALL
            .iter()
            .map(|&response| Candidate {
                action: response,
                prospects: belief
                    .iter()
                    .map(|(&player_type, &p)| {
                        Prospect::new(payoffs.responder_payoff(player_type, response), p)
                            .with_floor(payoffs.responder_worst_payoff(player_type))
                    })
                    .collect(),
            })
            .collect();
        let response = self
            .rule
            .choose(&candidates, &self.payoff_log, self.tie_break, rng)
            .map_or(Response::NoAction, |choice| choice.action);

        let rounds = self.next_round()?;
        self.signal_log.push(signal);
        self.response_log.push(response);
        self.rounds = rounds;
        self.state = Lifecycle::AwaitingOutcome;
        Ok(response)
    }

    /// Record the outcome of the round just decided and re-estimate beliefs
    /// from the full logs.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoPendingDecision`] if no decision is waiting
    /// for an outcome, and [`AgentError::Belief`] if the logs are out of
    /// step with the belief store.
    pub fn update_beliefs(&mut self, outcome: RoundOutcome) -> Result<(), AgentError> {
        if self.state != Lifecycle::AwaitingOutcome {
            return Err(AgentError::NoPendingDecision(self.id));
        }
        let Some(knowledge) = self.knowledge.as_mut() else {
            return Err(AgentError::NotInitialised(self.id));
        };

        // Logs only grow once the store has accepted the observation.
        match &mut knowledge.beliefs {
            Beliefs::Payoffs(store) => {
                let payoffs: Vec<OrderedFloat<f64>> = self
                    .payoff_log
                    .iter()
                    .copied()
                    .chain(std::iter::once(outcome.payoff))
                    .map(OrderedFloat)
                    .collect();
                store.reestimate(&self.signal_log, &payoffs)?;
                self.response_log.push(outcome.response);
            }
            Beliefs::Types(store) => {
                let mut opponents = self.opponent_type_log.clone();
                opponents.push(outcome.opponent_type);
                store.reestimate(&self.signal_log, &opponents)?;
                self.opponent_type_log = opponents;
            }
        }
        self.payoff_log.push(outcome.payoff);

        self.state = if self.target_reached() {
            Lifecycle::Finished
        } else {
            Lifecycle::Ready
        };
        Ok(())
    }

    /// Check that the agent plays `role` and can take its next decision,
    /// without changing anything.
    ///
    /// # Errors
    ///
    /// Returns the same error [`Agent::signal`] or [`Agent::respond`] would.
    pub fn ensure_ready(&self, role: Role) -> Result<(), AgentError> {
        self.require_role(role)?;
        self.require_ready()
    }

    fn require_role(&self, expected: Role) -> Result<(), AgentError> {
        if self.role == expected {
            Ok(())
        } else {
            Err(AgentError::WrongRole {
                agent_id: self.id,
                expected,
                actual: self.role,
            })
        }
    }

    const fn require_ready(&self) -> Result<(), AgentError> {
        match self.state {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Created => Err(AgentError::NotInitialised(self.id)),
            Lifecycle::AwaitingOutcome => Err(AgentError::OutcomePending(self.id)),
            Lifecycle::Finished => Err(AgentError::Finished(self.id)),
        }
    }

    fn next_round(&self) -> Result<u32, AgentError> {
        self.rounds
            .checked_add(1)
            .ok_or(AgentError::RoundOverflow(self.id))
    }

    fn target_reached(&self) -> bool {
        self.target_rounds.is_some_and(|target| self.rounds >= target)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The agent's identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Which side of the game the agent plays.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The agent's fixed type.
    pub const fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// The agent's decision rule.
    pub const fn rule(&self) -> &DecisionRule {
        &self.rule
    }

    /// The agent's tie-break policy.
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Lifecycle state.
    pub const fn state(&self) -> Lifecycle {
        self.state
    }

    /// Rounds decided so far.
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Rounds after which a signaller finishes.
    pub const fn target_rounds(&self) -> Option<u32> {
        self.target_rounds
    }

    /// Whether the agent has played all its rounds.
    pub fn is_finished(&self) -> bool {
        self.state == Lifecycle::Finished
    }

    /// The shared payoff model, once initialised.
    pub fn payoffs(&self) -> Option<&Arc<PayoffModel>> {
        self.knowledge.as_ref().map(|k| &k.payoffs)
    }

    /// Signals sent (signallers) or received (responders), oldest first.
    pub fn signal_log(&self) -> &[Signal] {
        &self.signal_log
    }

    /// Responses received (signallers) or chosen (responders), oldest first.
    pub fn response_log(&self) -> &[Response] {
        &self.response_log
    }

    /// Realised payoffs, oldest first.
    pub fn payoff_log(&self) -> &[f64] {
        &self.payoff_log
    }

    /// Types of the signallers met. Always empty for signallers.
    pub fn opponent_type_log(&self) -> &[PlayerType] {
        &self.opponent_type_log
    }

    /// Sum of realised payoffs.
    pub fn total_payoff(&self) -> f64 {
        self.payoff_log.iter().sum()
    }

    /// A signaller's payoff belief store.
    pub const fn payoff_beliefs(&self) -> Option<&BeliefStore<OrderedFloat<f64>>> {
        match &self.knowledge {
            Some(Knowledge {
                beliefs: Beliefs::Payoffs(store),
                ..
            }) => Some(store),
            _ => None,
        }
    }

    /// A responder's type belief store.
    pub const fn type_beliefs(&self) -> Option<&BeliefStore<PlayerType>> {
        match &self.knowledge {
            Some(Knowledge {
                beliefs: Beliefs::Types(store),
                ..
            }) => Some(store),
            _ => None,
        }
    }

    /// Full probability sequence for (`signal`, `key`).
    ///
    /// Entry `r` is the belief held going into round `r`.
    pub fn belief_history(&self, signal: Signal, key: BeliefKey) -> Option<&[f64]> {
        match (self.knowledge.as_ref().map(|k| &k.beliefs), key) {
            (Some(Beliefs::Payoffs(store)), BeliefKey::Payoff(payoff)) => {
                store.history(signal, OrderedFloat(payoff))
            }
            (Some(Beliefs::Types(store)), BeliefKey::Type(player_type)) => {
                store.history(signal, player_type)
            }
            _ => None,
        }
    }

    /// Latest beliefs, flattened. Responder outcomes are type ordinals.
    pub fn current_beliefs(&self) -> Vec<BeliefPoint> {
        let Some(knowledge) = &self.knowledge else {
            return Vec::new();
        };
        Signal::ALL
            .iter()
            .flat_map(|&signal| -> Vec<BeliefPoint> {
                match &knowledge.beliefs {
                    Beliefs::Payoffs(store) => store
                        .current(signal)
                        .into_iter()
                        .map(|(payoff, probability)| BeliefPoint {
                            signal,
                            outcome: payoff.into_inner(),
                            probability,
                        })
                        .collect(),
                    Beliefs::Types(store) => store
                        .current(signal)
                        .into_iter()
                        .map(|(player_type, probability)| BeliefPoint {
                            signal,
                            outcome: ordinal(player_type),
                            probability,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Fraction of rounds with a truthful signal: the agent's own signals
    /// for a signaller, the signals received for a responder.
    pub fn truthful_fraction(&self) -> Option<f64> {
        let truthful = match self.role {
            Role::Signaller => self
                .signal_log
                .iter()
                .filter(|signal| signal.is_truthful_for(self.player_type))
                .count(),
            Role::Responder => self
                .signal_log
                .iter()
                .zip(&self.opponent_type_log)
                .filter(|&(signal, &player_type)| signal.is_truthful_for(player_type))
                .count(),
        };
        let attributable = match self.role {
            Role::Signaller => self.signal_log.len(),
            Role::Responder => self.opponent_type_log.len(),
        };
        fraction(truthful, attributable)
    }

    /// End-of-run snapshot for reporting.
    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id,
            role: self.role,
            player_type: self.player_type,
            rounds: self.rounds,
            finished: self.is_finished(),
            total_payoff: self.total_payoff(),
            truthful_fraction: self.truthful_fraction(),
            beliefs: self.current_beliefs(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64)
}

#[allow(clippy::cast_precision_loss)]
fn ordinal(player_type: PlayerType) -> f64 {
    player_type.index() as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::payoff::PayoffParams;

    fn model() -> Arc<PayoffModel> {
        Arc::new(PayoffModel::build(PayoffParams::default()).unwrap())
    }

    fn uniform() -> PerType<f64> {
        PerType::uniform(1.0 / 3.0)
    }

    fn ready_signaller(player_type: PlayerType, rounds: u32) -> Agent {
        let mut agent =
            Agent::signaller(AgentId::new(), player_type, DecisionRule::Bayesian, rounds).unwrap();
        agent.init_signaller(model(), &uniform()).unwrap();
        agent
    }

    fn ready_responder() -> Agent {
        let mut agent =
            Agent::responder(AgentId::new(), PlayerType::Middle, DecisionRule::Bayesian).unwrap();
        agent
            .init_responder(model(), &PerSignal::uniform(uniform()))
            .unwrap();
        agent
    }

    #[test]
    fn init_is_idempotent() {
        let first = model();
        let mut agent =
            Agent::signaller(AgentId::new(), PlayerType::High, DecisionRule::Bayesian, 3).unwrap();
        agent.init_signaller(Arc::clone(&first), &uniform()).unwrap();
        let priors = agent.payoff_beliefs().unwrap().clone();

        let weights = PerType {
            low: 0.9,
            middle: 0.05,
            high: 0.05,
        };
        agent.init_signaller(model(), &weights).unwrap();
        assert!(Arc::ptr_eq(agent.payoffs().unwrap(), &first));
        assert_eq!(agent.payoff_beliefs().unwrap(), &priors);
        assert_eq!(agent.state(), Lifecycle::Ready);
    }

    #[test]
    fn signaller_priors_split_over_responses() {
        let agent = ready_signaller(PlayerType::High, 3);
        let store = agent.payoff_beliefs().unwrap();
        // Six distinct payoffs per signal, each weighted (1/3) / 2.
        assert_eq!(store.outcomes(Signal::Light).count(), 6);
        let p = store
            .probability(Signal::Light, OrderedFloat(-103.0))
            .unwrap();
        assert!((p - 1.0 / 6.0).abs() < 1e-12);

        // A low type's payoff ignores the response, so both halves merge.
        let agent = ready_signaller(PlayerType::Low, 3);
        let store = agent.payoff_beliefs().unwrap();
        assert_eq!(store.outcomes(Signal::Light).count(), 3);
        let p = store.probability(Signal::Light, OrderedFloat(-1.0)).unwrap();
        assert!((p - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn decisions_advance_round_counter() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut signaller = ready_signaller(PlayerType::Low, 5);
        let mut responder = ready_responder();
        for expected in 1..=3 {
            let signal = signaller.signal(&mut rng).unwrap();
            assert_eq!(signaller.rounds(), expected);
            assert_eq!(signaller.signal_log().len(), expected as usize);

            let response = responder.respond(signal, &mut rng).unwrap();
            assert_eq!(responder.rounds(), expected);
            assert_eq!(responder.response_log().len(), expected as usize);

            signaller
                .update_beliefs(RoundOutcome {
                    payoff: -1.0,
                    opponent_type: PlayerType::Middle,
                    response,
                })
                .unwrap();
            responder
                .update_beliefs(RoundOutcome {
                    payoff: 0.0,
                    opponent_type: PlayerType::Low,
                    response,
                })
                .unwrap();
        }
        assert_eq!(signaller.payoff_log().len(), 3);
        assert_eq!(responder.opponent_type_log().len(), 3);
        assert!(signaller.opponent_type_log().is_empty());
        assert_eq!(
            responder.belief_history(Signal::Light, BeliefKey::Type(PlayerType::Low)).unwrap().len(),
            4
        );
    }

    #[test]
    fn low_bayesian_signaller_sends_light() {
        let mut agent = ready_signaller(PlayerType::Low, 1);
        let signal = agent.signal(&mut SmallRng::seed_from_u64(3)).unwrap();
        assert_eq!(signal, Signal::Light);
    }

    #[test]
    fn lifecycle_violations_are_errors() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut fresh =
            Agent::signaller(AgentId::new(), PlayerType::Low, DecisionRule::Minimax, 1).unwrap();
        assert!(matches!(
            fresh.signal(&mut rng),
            Err(AgentError::NotInitialised(_))
        ));

        let mut agent = ready_signaller(PlayerType::Middle, 1);
        let outcome = RoundOutcome {
            payoff: -2.0,
            opponent_type: PlayerType::Low,
            response: Response::Refer,
        };
        assert!(matches!(
            agent.update_beliefs(outcome),
            Err(AgentError::NoPendingDecision(_))
        ));
        agent.signal(&mut rng).unwrap();
        assert!(matches!(
            agent.signal(&mut rng),
            Err(AgentError::OutcomePending(_))
        ));
        agent.update_beliefs(outcome).unwrap();
        assert!(agent.is_finished());
        assert!(matches!(agent.signal(&mut rng), Err(AgentError::Finished(_))));

        assert!(matches!(
            agent.respond(Signal::Light, &mut rng),
            Err(AgentError::WrongRole { .. })
        ));
        let mut responder = ready_responder();
        assert!(matches!(
            responder.init_signaller(model(), &uniform()),
            Err(AgentError::WrongRole { .. })
        ));
    }

    #[test]
    fn rejected_update_leaves_logs_untouched() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut responder = ready_responder();
        responder.respond(Signal::Heavy, &mut rng).unwrap();
        // A signal the store never saw a decision for puts it out of step.
        responder.signal_log.push(Signal::Light);
        let outcome = RoundOutcome {
            payoff: -50.0,
            opponent_type: PlayerType::High,
            response: Response::Refer,
        };
        assert!(matches!(
            responder.update_beliefs(outcome),
            Err(AgentError::Belief { .. })
        ));
        assert!(responder.payoff_log().is_empty());
        assert!(responder.opponent_type_log().is_empty());
        assert_eq!(responder.state(), Lifecycle::AwaitingOutcome);

        let mut signaller = ready_signaller(PlayerType::Middle, 3);
        signaller.signal(&mut rng).unwrap();
        signaller.signal_log.push(Signal::Light);
        assert!(signaller.update_beliefs(outcome).is_err());
        assert!(signaller.payoff_log().is_empty());
        assert!(signaller.response_log().is_empty());
    }

    #[test]
    fn ensure_ready_checks_role_and_state() {
        let mut rng = SmallRng::seed_from_u64(6);
        let fresh =
            Agent::responder(AgentId::new(), PlayerType::Low, DecisionRule::Bayesian).unwrap();
        assert!(matches!(
            fresh.ensure_ready(Role::Responder),
            Err(AgentError::NotInitialised(_))
        ));
        let mut signaller = ready_signaller(PlayerType::Low, 2);
        assert!(signaller.ensure_ready(Role::Signaller).is_ok());
        assert!(matches!(
            signaller.ensure_ready(Role::Responder),
            Err(AgentError::WrongRole { .. })
        ));
        signaller.signal(&mut rng).unwrap();
        assert!(matches!(
            signaller.ensure_ready(Role::Signaller),
            Err(AgentError::OutcomePending(_))
        ));
    }

    #[test]
    fn worst_case_responder_ties_on_uniform_belief() {
        let rule = DecisionRule::ProspectTheory(crate::decision::ProspectTheory {
            weighting: crate::weighting::ProbabilityWeighting::TverskyKahneman { gamma: 0.5 },
            reference: crate::decision::ReferenceMode::WorstCase,
        });
        let mut responder = Agent::responder(AgentId::new(), PlayerType::High, rule).unwrap();
        responder
            .init_responder(model(), &PerSignal::uniform(uniform()))
            .unwrap();
        let response = responder
            .respond(Signal::Moderate, &mut SmallRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(response, Response::NoAction);
    }

    #[test]
    fn invalid_rules_and_priors_fail_fast() {
        let rule = DecisionRule::CumulativeProspectTheory(crate::valuation::CptParams {
            gamma: -1.0,
            ..crate::valuation::CptParams::default()
        });
        assert!(matches!(
            Agent::responder(AgentId::new(), PlayerType::Low, rule),
            Err(AgentError::Rule { .. })
        ));

        let mut agent =
            Agent::signaller(AgentId::new(), PlayerType::Low, DecisionRule::Bayesian, 2).unwrap();
        let result = agent.init_signaller(model(), &PerType::uniform(0.0));
        assert!(matches!(result, Err(AgentError::Belief { .. })));
        assert_eq!(agent.state(), Lifecycle::Created);
    }

    #[test]
    fn summary_reports_truthfulness() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut agent = ready_signaller(PlayerType::Low, 2);
        assert_eq!(agent.summary().truthful_fraction, None);
        for _ in 0..2 {
            agent.signal(&mut rng).unwrap();
            agent
                .update_beliefs(RoundOutcome {
                    payoff: -1.0,
                    opponent_type: PlayerType::Low,
                    response: Response::NoAction,
                })
                .unwrap();
        }
        let summary = agent.summary();
        assert_eq!(summary.rounds, 2);
        assert!(summary.finished);
        assert_eq!(summary.total_payoff, -2.0);
        assert_eq!(summary.truthful_fraction, Some(1.0));
        assert_eq!(summary.beliefs.len(), 9);
    }
}
