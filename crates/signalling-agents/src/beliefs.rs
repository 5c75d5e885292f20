//! Online belief estimation over a finite outcome space.
//!
//! A [`BeliefStore`] holds, for every signal and every outcome key, an
//! append-only sequence of posterior-mean probabilities. Entry `r` of a
//! sequence is the belief held going into round `r`; entry 0 is the prior.
//! Signallers key outcomes by payoff value, responders by signaller type.
//!
//! # Update rule
//!
//! Each outcome carries a Dirichlet prior weight `alpha_k`; the prior mass
//! of a signal is the sum of its weights `alpha_dot`. After every round the
//! whole observation log is rescanned and, for each (signal, outcome):
//!
//! ```text
//! P(outcome | signal) = (alpha_k + n_k) / (alpha_dot + n)
//! ```
//!
//! where `n` counts rounds with that signal and `n_k` counts rounds with
//! both that signal and that outcome. Every key gets a new entry every
//! round, whether or not its signal was involved. This is a full-history
//! re-estimation and costs `O(rounds)` per update.

use std::collections::BTreeMap;

use signalling_types::{PerSignal, Signal};

/// Errors raised by belief construction and updates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeliefError {
    /// A prior weight was negative, NaN, or infinite.
    #[error("prior weight for signal {signal} must be finite and non-negative (got {value})")]
    InvalidPrior {
        /// The signal whose prior is invalid.
        signal: Signal,
        /// The rejected weight.
        value: f64,
    },

    /// A signal has no outcome keys.
    #[error("signal {signal} has an empty outcome set")]
    EmptyOutcomes {
        /// The signal with no outcomes.
        signal: Signal,
    },

    /// The prior weights of a signal sum to zero.
    #[error("signal {signal} has zero prior mass")]
    ZeroPriorMass {
        /// The signal with no prior mass.
        signal: Signal,
    },

    /// The signal log and outcome log differ in length.
    #[error("log length mismatch: {signals} signals but {outcomes} outcomes")]
    LengthMismatch {
        /// Number of logged signals.
        signals: usize,
        /// Number of logged outcomes.
        outcomes: usize,
    },

    /// The logs do not hold exactly one unseen observation.
    #[error("expected {expected} observations in the log, found {found}")]
    OutOfStep {
        /// Observations the store expected (rounds already folded in plus one).
        expected: usize,
        /// Observations actually present in the log.
        found: usize,
    },
}

/// Dirichlet posterior mean `(alpha_k + n_k) / (alpha_dot + n)`.
///
/// With no observations this is the prior ratio `alpha_k / alpha_dot`.
/// Callers guarantee `alpha_dot > 0`.
#[allow(clippy::cast_precision_loss)]
pub fn posterior_mean(alpha_k: f64, alpha_dot: f64, n_k: usize, n: usize) -> f64 {
    (alpha_k + n_k as f64) / (alpha_dot + n as f64)
}

/// Per-signal categorical beliefs with full round history.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefStore<K: Ord + Copy> {
    /// Prior weight `alpha_k` for every (signal, outcome).
    priors: PerSignal<BTreeMap<K, f64>>,
    /// Prior mass `alpha_dot` per signal.
    prior_mass: PerSignal<f64>,
    /// Probability sequence for every (signal, outcome).
    history: PerSignal<BTreeMap<K, Vec<f64>>>,
    /// Observations folded into the history so far.
    observed: usize,
}

impl<K: Ord + Copy> BeliefStore<K> {
    /// Create a store from per-signal prior weights.
    ///
    /// The first history entry for every key is its prior ratio.
    ///
    /// # Errors
    ///
    /// Returns [`BeliefError::InvalidPrior`] for a negative or non-finite
    /// weight, [`BeliefError::EmptyOutcomes`] for a signal without outcome
    /// keys, and [`BeliefError::ZeroPriorMass`] when a signal's weights sum
    /// to zero.
    pub fn new(priors: PerSignal<BTreeMap<K, f64>>) -> Result<Self, BeliefError> {
        for (signal, weights) in priors.iter() {
            if weights.is_empty() {
                return Err(BeliefError::EmptyOutcomes { signal });
            }
            if let Some(&value) = weights.values().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(BeliefError::InvalidPrior { signal, value });
            }
            if weights.values().sum::<f64>() <= 0.0 {
                return Err(BeliefError::ZeroPriorMass { signal });
            }
        }

        let prior_mass = priors.clone().map(|weights| weights.values().sum::<f64>());
        let history = PerSignal::from_fn(|signal| {
            let mass = *prior_mass.get(signal);
            priors
                .get(signal)
                .iter()
                .map(|(&key, &alpha)| (key, vec![posterior_mean(alpha, mass, 0, 0)]))
                .collect()
        });

        Ok(Self {
            priors,
            prior_mass,
            history,
            observed: 0,
        })
    }

    /// Create a store where every signal shares the same outcome keys and
    /// the same weight per key.
    pub fn uniform(keys: &[K], weight: f64) -> Result<Self, BeliefError> {
        let weights: BTreeMap<K, f64> = keys.iter().map(|&k| (k, weight)).collect();
        Self::new(PerSignal::uniform(weights))
    }

    /// Fold the newest observation into the beliefs.
    ///
    /// `signals` and `outcomes` are the complete logs up to and including the
    /// current round. Every (signal, outcome) probability is recomputed from
    /// the full logs and appended to its sequence. Outcomes that are not keys
    /// of the store still count towards `n` for their signal.
    ///
    /// # Errors
    ///
    /// Returns [`BeliefError::LengthMismatch`] if the logs differ in length,
    /// or [`BeliefError::OutOfStep`] if they do not contain exactly one
    /// observation more than has already been folded in.
    pub fn reestimate(&mut self, signals: &[Signal], outcomes: &[K]) -> Result<(), BeliefError> {
        if signals.len() != outcomes.len() {
            return Err(BeliefError::LengthMismatch {
                signals: signals.len(),
                outcomes: outcomes.len(),
            });
        }
        let expected = self.observed.saturating_add(1);
        if signals.len() != expected {
            return Err(BeliefError::OutOfStep {
                expected,
                found: signals.len(),
            });
        }

        for signal in Signal::ALL {
            let n = signals.iter().filter(|&&s| s == signal).count();
            let mass = *self.prior_mass.get(signal);
            let priors = self.priors.get(signal);
            for (key, sequence) in self.history.get_mut(signal).iter_mut() {
                let n_k = signals
                    .iter()
                    .zip(outcomes)
                    .filter(|&(&s, o)| s == signal && o == key)
                    .count();
                let alpha = priors.get(key).copied().unwrap_or(0.0);
                sequence.push(posterior_mean(alpha, mass, n_k, n));
            }
        }

        self.observed = expected;
        Ok(())
    }

    /// Number of observations folded in so far.
    pub const fn rounds_observed(&self) -> usize {
        self.observed
    }

    /// Outcome keys known for `signal`, in ascending order.
    pub fn outcomes(&self, signal: Signal) -> impl Iterator<Item = K> + '_ {
        self.priors.get(signal).keys().copied()
    }

    /// Prior weight `alpha_k` for (`signal`, `key`).
    pub fn prior(&self, signal: Signal, key: K) -> Option<f64> {
        self.priors.get(signal).get(&key).copied()
    }

    /// Prior mass `alpha_dot` of `signal`.
    pub const fn prior_mass(&self, signal: Signal) -> f64 {
        *self.prior_mass.get(signal)
    }

    /// Latest probability for (`signal`, `key`).
    pub fn probability(&self, signal: Signal, key: K) -> Option<f64> {
        self.probability_at(signal, key, self.observed)
    }

    /// Probability for (`signal`, `key`) as held going into `round`.
    pub fn probability_at(&self, signal: Signal, key: K, round: usize) -> Option<f64> {
        self.history
            .get(signal)
            .get(&key)
            .and_then(|sequence| sequence.get(round))
            .copied()
    }

    /// The full probability sequence for (`signal`, `key`).
    pub fn history(&self, signal: Signal, key: K) -> Option<&[f64]> {
        self.history.get(signal).get(&key).map(Vec::as_slice)
    }

    /// Latest distribution over outcomes for `signal`.
    pub fn current(&self, signal: Signal) -> BTreeMap<K, f64> {
        self.distribution_at(signal, self.observed)
    }

    /// Distribution over outcomes for `signal` as held going into `round`.
    ///
    /// Rounds beyond the history are omitted key by key, so the result is
    /// empty for a round that has not happened yet.
    pub fn distribution_at(&self, signal: Signal, round: usize) -> BTreeMap<K, f64> {
        self.history
            .get(signal)
            .iter()
            .filter_map(|(&key, sequence)| sequence.get(round).map(|&p| (key, p)))
            .collect()
    }

    /// Latest distributions for every signal.
    pub fn snapshot(&self) -> PerSignal<BTreeMap<K, f64>> {
        PerSignal::from_fn(|signal| self.current(signal))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use signalling_types::PlayerType;

    use super::*;

    const EPS: f64 = 1e-12;

    fn uniform_types() -> BeliefStore<PlayerType> {
        BeliefStore::uniform(&PlayerType::ALL, 1.0 / 3.0).unwrap()
    }

    #[test]
    fn uniform_prior_is_normalized() {
        let store = uniform_types();
        for signal in Signal::ALL {
            let dist = store.current(signal);
            assert_eq!(dist.len(), 3);
            for p in dist.values() {
                assert!((p - 1.0 / 3.0).abs() < EPS);
            }
            assert!((dist.values().sum::<f64>() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn posterior_mean_without_observations_is_prior_ratio() {
        assert!((posterior_mean(0.25, 1.0, 0, 0) - 0.25).abs() < EPS);
        assert!((posterior_mean(1.0, 3.0, 2, 4) - 3.0 / 7.0).abs() < EPS);
    }

    #[test]
    fn reestimate_appends_for_every_key() {
        let mut store = uniform_types();
        store
            .reestimate(&[Signal::Light], &[PlayerType::Low])
            .unwrap();
        assert_eq!(store.rounds_observed(), 1);
        for signal in Signal::ALL {
            for key in PlayerType::ALL {
                assert_eq!(store.history(signal, key).unwrap().len(), 2);
            }
        }
        // (1/3 + 1) / (1 + 1)
        let p = store.probability(Signal::Light, PlayerType::Low).unwrap();
        assert!((p - 2.0 / 3.0).abs() < EPS);
        // Unused signals stay at the prior ratio.
        let q = store.probability(Signal::Heavy, PlayerType::Low).unwrap();
        assert!((q - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn beliefs_stay_normalized_after_updates() {
        let mut store = uniform_types();
        let signals = [Signal::Light, Signal::Light, Signal::Moderate, Signal::Light];
        let outcomes = [
            PlayerType::Low,
            PlayerType::Middle,
            PlayerType::Middle,
            PlayerType::Low,
        ];
        for round in 1..=signals.len() {
            store
                .reestimate(&signals[..round], &outcomes[..round])
                .unwrap();
        }
        for signal in Signal::ALL {
            let total: f64 = store.current(signal).values().sum();
            assert!((total - 1.0).abs() < EPS);
        }
        // Earlier entries are untouched by later rounds.
        let light_low = store.history(Signal::Light, PlayerType::Low).unwrap();
        assert!((light_low[0] - 1.0 / 3.0).abs() < EPS);
        assert!((light_low[1] - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn reestimate_rejects_out_of_step_logs() {
        let mut store = uniform_types();
        let err = store.reestimate(
            &[Signal::Light, Signal::Light],
            &[PlayerType::Low, PlayerType::Low],
        );
        assert_eq!(
            err,
            Err(BeliefError::OutOfStep {
                expected: 1,
                found: 2
            })
        );
        let err = store.reestimate(&[Signal::Light], &[]);
        assert!(matches!(err, Err(BeliefError::LengthMismatch { .. })));
        assert_eq!(store.rounds_observed(), 0);
    }

    #[test]
    fn rejects_invalid_priors() {
        let err = BeliefStore::uniform(&PlayerType::ALL, -1.0);
        assert!(matches!(err, Err(BeliefError::InvalidPrior { .. })));
        let err = BeliefStore::uniform(&PlayerType::ALL, 0.0);
        assert!(matches!(err, Err(BeliefError::ZeroPriorMass { .. })));
        let err = BeliefStore::<PlayerType>::uniform(&[], 1.0);
        assert!(matches!(err, Err(BeliefError::EmptyOutcomes { .. })));
        let err = BeliefStore::uniform(&PlayerType::ALL, f64::NAN);
        assert!(matches!(err, Err(BeliefError::InvalidPrior { .. })));
    }

    #[test]
    fn distribution_at_future_round_is_empty() {
        let store = uniform_types();
        assert!(store.distribution_at(Signal::Light, 5).is_empty());
        assert_eq!(store.distribution_at(Signal::Light, 0).len(), 3);
    }
}
