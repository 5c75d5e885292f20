//! Per-round measures over finished populations.
//!
//! Every measure reads agents and round records through their public
//! accessors only. Per-round series are indexed by the agent's own round
//! number; a round in which nobody in the relevant group played yields 0.

use serde::{Deserialize, Serialize};
use signalling_agents::Agent;
use signalling_types::{PerSignal, PerType, PlayerType, Response, RoundRecord, Signal};

/// `count / total`, or 0 when `total` is zero.
#[allow(clippy::cast_precision_loss)]
fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Arithmetic mean, or `None` for an empty slice.
#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn bump(slot: Option<&mut usize>) {
    if let Some(count) = slot {
        *count = count.saturating_add(1);
    }
}

/// Longest signal log in `agents`.
fn max_rounds(agents: &[Agent]) -> usize {
    agents
        .iter()
        .map(|agent| agent.signal_log().len())
        .max()
        .unwrap_or(0)
}

/// Referral behaviour per round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferralRate {
    /// Fraction of responders referring.
    pub overall: Vec<f64>,
    /// Fraction of responders referring among those who received each signal.
    pub by_signal: PerSignal<Vec<f64>>,
}

/// Everything measured at the end of an experiment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measures {
    /// See [`signal_choice`].
    pub signal_choice: PerType<PerSignal<Vec<f64>>>,
    /// See [`referral_rate`].
    pub referral_rate: ReferralRate,
    /// See [`mean_type_belief`].
    pub mean_type_belief: PerSignal<PerType<Vec<f64>>>,
    /// See [`honesty_rate`].
    pub honesty_rate: Vec<f64>,
    /// See [`right_calls`].
    pub right_calls: Vec<f64>,
    /// See [`false_positives`].
    pub false_positives: Vec<f64>,
    /// See [`false_negatives`].
    pub false_negatives: Vec<f64>,
    /// Mean accrued payoff of signallers per type.
    pub signaller_payoffs: PerType<Option<f64>>,
    /// Mean accrued payoff of responders per type.
    pub responder_payoffs: PerType<Option<f64>>,
}

impl Measures {
    /// Compute every measure.
    pub fn compute(signallers: &[Agent], responders: &[Agent], records: &[RoundRecord]) -> Self {
        Self {
            signal_choice: signal_choice(signallers),
            referral_rate: referral_rate(responders),
            mean_type_belief: mean_type_belief(responders),
            honesty_rate: honesty_rate(records),
            right_calls: right_calls(responders),
            false_positives: false_positives(responders),
            false_negatives: false_negatives(responders),
            signaller_payoffs: accrued_payoffs(signallers),
            responder_payoffs: accrued_payoffs(responders),
        }
    }
}

/// For each signaller type and signal, the fraction of signallers of that
/// type who sent that signal in each round.
pub fn signal_choice(signallers: &[Agent]) -> PerType<PerSignal<Vec<f64>>> {
    let rounds = max_rounds(signallers);
    PerType::from_fn(|player_type| {
        let group: Vec<&Agent> = signallers
            .iter()
            .filter(|agent| agent.player_type() == player_type)
            .collect();
        let mut played = vec![0_usize; rounds];
        let mut sent: PerSignal<Vec<usize>> = PerSignal::from_fn(|_| vec![0; rounds]);
        for agent in &group {
            for (round, &signal) in agent.signal_log().iter().enumerate() {
                bump(played.get_mut(round));
                bump(sent.get_mut(signal).get_mut(round));
            }
        }
        sent.map(|counts| {
            counts
                .iter()
                .zip(&played)
                .map(|(&count, &total)| ratio(count, total))
                .collect()
        })
    })
}

/// Per round, the overall and per-signal referral fraction among responders.
pub fn referral_rate(responders: &[Agent]) -> ReferralRate {
    let rounds = max_rounds(responders);
    let mut played = vec![0_usize; rounds];
    let mut referred = vec![0_usize; rounds];
    let mut received: PerSignal<Vec<usize>> = PerSignal::from_fn(|_| vec![0; rounds]);
    let mut referred_by_signal: PerSignal<Vec<usize>> = PerSignal::from_fn(|_| vec![0; rounds]);

    for agent in responders {
        let decisions = agent.signal_log().iter().zip(agent.response_log());
        for (round, (&signal, &response)) in decisions.enumerate() {
            bump(played.get_mut(round));
            bump(received.get_mut(signal).get_mut(round));
            if response == Response::Refer {
                bump(referred.get_mut(round));
                bump(referred_by_signal.get_mut(signal).get_mut(round));
            }
        }
    }

    let overall = referred
        .iter()
        .zip(&played)
        .map(|(&count, &total)| ratio(count, total))
        .collect();
    let by_signal = PerSignal::from_fn(|signal| {
        referred_by_signal
            .get(signal)
            .iter()
            .zip(received.get(signal))
            .map(|(&count, &total)| ratio(count, total))
            .collect()
    });
    ReferralRate { overall, by_signal }
}

/// For each signal and signaller type, the responders' average belief
/// P(type | signal) going into each round.
///
/// The series has one more entry than the longest-lived responder has
/// rounds; entry 0 is the average prior.
pub fn mean_type_belief(responders: &[Agent]) -> PerSignal<PerType<Vec<f64>>> {
    let stores: Vec<_> = responders
        .iter()
        .filter_map(Agent::type_beliefs)
        .collect();
    let points = stores
        .iter()
        .map(|store| store.rounds_observed().saturating_add(1))
        .max()
        .unwrap_or(0);

    PerSignal::from_fn(|signal| {
        PerType::from_fn(|player_type| {
            (0..points)
                .map(|round| {
                    let values: Vec<f64> = stores
                        .iter()
                        .filter_map(|store| store.probability_at(signal, player_type, round))
                        .collect();
                    mean(&values).unwrap_or(0.0)
                })
                .collect()
        })
    })
}

/// Per signaller round, the fraction of signals that named the sender's
/// true type.
pub fn honesty_rate(records: &[RoundRecord]) -> Vec<f64> {
    let rounds = records
        .iter()
        .map(|record| usize::try_from(record.signaller_round).unwrap_or(usize::MAX))
        .max()
        .map_or(0, |last| last.saturating_add(1));
    let mut played = vec![0_usize; rounds];
    let mut truthful = vec![0_usize; rounds];
    for record in records {
        let round = usize::try_from(record.signaller_round).unwrap_or(usize::MAX);
        bump(played.get_mut(round));
        if record.truthful {
            bump(truthful.get_mut(round));
        }
    }
    truthful
        .iter()
        .zip(&played)
        .map(|(&count, &total)| ratio(count, total))
        .collect()
}

/// Per responder round: how many decisions passed `selected`, and how many
/// of those were also `hit`.
fn call_rate(
    responders: &[Agent],
    selected: impl Fn(Response, PlayerType) -> bool,
    hit: impl Fn(Response, PlayerType) -> bool,
) -> Vec<f64> {
    let rounds = max_rounds(responders);
    let mut totals = vec![0_usize; rounds];
    let mut hits = vec![0_usize; rounds];
    for agent in responders {
        let calls = agent.response_log().iter().zip(agent.opponent_type_log());
        for (round, (&response, &player_type)) in calls.enumerate() {
            if selected(response, player_type) {
                bump(totals.get_mut(round));
                if hit(response, player_type) {
                    bump(hits.get_mut(round));
                }
            }
        }
    }
    hits.iter()
        .zip(&totals)
        .map(|(&count, &total)| ratio(count, total))
        .collect()
}

/// Whether a response was right for the signaller's true type: refer
/// anyone who drinks, leave light drinkers alone.
pub fn is_right_call(response: Response, signaller_type: PlayerType) -> bool {
    (response == Response::Refer) == (signaller_type != PlayerType::Low)
}

/// Per round, the fraction of responders who made the right call.
pub fn right_calls(responders: &[Agent]) -> Vec<f64> {
    call_rate(responders, |_, _| true, is_right_call)
}

/// Per round, the fraction of referrals that were of a low type.
pub fn false_positives(responders: &[Agent]) -> Vec<f64> {
    call_rate(
        responders,
        |response, _| response == Response::Refer,
        |_, player_type| player_type == PlayerType::Low,
    )
}

/// Per round, the fraction of non-referrals that were of a non-low type.
pub fn false_negatives(responders: &[Agent]) -> Vec<f64> {
    call_rate(
        responders,
        |response, _| response == Response::NoAction,
        |_, player_type| player_type != PlayerType::Low,
    )
}

/// Mean total payoff of the agents of each type; `None` for absent types.
pub fn accrued_payoffs(agents: &[Agent]) -> PerType<Option<f64>> {
    PerType::from_fn(|player_type| {
        let totals: Vec<f64> = agents
            .iter()
            .filter(|agent| agent.player_type() == player_type)
            .map(Agent::total_payoff)
            .collect();
        mean(&totals)
    })
}

/// The signal a group of signallers sent most often overall.
pub fn most_frequent_signal(signallers: &[Agent]) -> Option<Signal> {
    let counts = PerSignal::from_fn(|signal| {
        signallers
            .iter()
            .flat_map(|agent| agent.signal_log())
            .filter(|&&sent| sent == signal)
            .count()
    });
    counts
        .iter()
        .filter(|&(_, &count)| count > 0)
        .max_by_key(|&(signal, &count)| (count, std::cmp::Reverse(signal)))
        .map(|(signal, _)| signal)
}
