//! Pairing policies.
//!
//! A [`Matching`] policy decides which responder each signaller meets,
//! round after round, until every signaller has played its target number
//! of rounds. Responders are shared and keep learning across pairings;
//! signallers are consumed and handed back once finished.
//!
//! - [`RandomPairing`] -- a uniformly random responder for every round
//! - [`Caseload`] -- each signaller stays with one responder for life
//! - [`EqualRounds`] -- everyone plays every round, paired afresh each time

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use signalling_agents::Agent;
use tracing::info;

use crate::game::{Game, GameError};

/// Errors raised by pairing policies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchingError {
    /// Signallers were waiting but there was nobody to respond.
    #[error("{signallers} signallers but no responders")]
    NoResponders {
        /// Signallers waiting to play.
        signallers: usize,
    },

    /// Index-wise pairing needs a responder for every signaller.
    #[error("equal rounds needs at least as many responders ({responders}) as signallers ({signallers})")]
    NotEnoughResponders {
        /// Number of signallers.
        signallers: usize,
        /// Number of responders.
        responders: usize,
    },

    /// A round failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying game error.
        #[from]
        source: GameError,
    },
}

/// Whether every agent in `population` has played at least `target` rounds.
pub fn all_played<'a>(population: impl IntoIterator<Item = &'a Agent>, target: u32) -> bool {
    population.into_iter().all(|agent| agent.rounds() >= target)
}

/// Whether every caseload has been played out to `target` rounds.
pub fn all_played_caseload<'a>(
    caseloads: impl IntoIterator<Item = &'a VecDeque<Agent>>,
    target: u32,
) -> bool {
    caseloads
        .into_iter()
        .all(|cases| all_played(cases, target))
}

/// A policy for pairing signallers with responders.
pub trait Matching {
    /// Play every signaller out to `rounds` rounds and return them.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError`] if the populations cannot be paired or a
    /// round fails.
    fn run<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        signallers: Vec<Agent>,
        responders: &mut [Agent],
        rounds: u32,
        rng: &mut R,
    ) -> Result<Vec<Agent>, MatchingError>;
}

// ---------------------------------------------------------------------------
// RandomPairing
// ---------------------------------------------------------------------------

/// Each game pairs the next signaller with a uniformly random responder.
///
/// Waiting signallers are reshuffled after every game, so nobody is
/// guaranteed to go next.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPairing;

impl Matching for RandomPairing {
    fn run<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        signallers: Vec<Agent>,
        responders: &mut [Agent],
        rounds: u32,
        rng: &mut R,
    ) -> Result<Vec<Agent>, MatchingError> {
        let mut finished = Vec::with_capacity(signallers.len());
        let mut pool = signallers;
        if !pool.is_empty() && responders.is_empty() {
            return Err(MatchingError::NoResponders {
                signallers: pool.len(),
            });
        }

        while let Some(mut signaller) = pool.pop() {
            if signaller.rounds() < rounds {
                let index = rng.random_range(0..responders.len());
                if let Some(responder) = responders.get_mut(index) {
                    game.play_game(&mut signaller, responder, rng)?;
                }
            }
            if signaller.rounds() >= rounds || signaller.is_finished() {
                finished.push(signaller);
            } else {
                pool.push(signaller);
            }
            pool.shuffle(rng);
        }
        Ok(finished)
    }
}

// ---------------------------------------------------------------------------
// Caseload
// ---------------------------------------------------------------------------

/// Each signaller is assigned one responder for all of its rounds.
///
/// Every responder receives `signallers / responders` cases; leftovers go
/// to random responders. Responders then work through their caseloads
/// round-robin, one game per responder per sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct Caseload;

impl Caseload {
    /// Split `signallers` into one queue per responder.
    pub fn assign<R: Rng + ?Sized>(
        signallers: Vec<Agent>,
        responders: usize,
        rng: &mut R,
    ) -> Result<Vec<VecDeque<Agent>>, MatchingError> {
        if responders == 0 {
            return Err(MatchingError::NoResponders {
                signallers: signallers.len(),
            });
        }
        let load = signallers.len().checked_div(responders).unwrap_or(0);
        let mut remaining = signallers;
        let mut caseloads: Vec<VecDeque<Agent>> = (0..responders)
            .map(|_| {
                let split = remaining.len().saturating_sub(load);
                remaining.split_off(split).into_iter().collect()
            })
            .collect();

        while let Some(signaller) = remaining.pop() {
            let index = rng.random_range(0..responders);
            if let Some(cases) = caseloads.get_mut(index) {
                cases.push_back(signaller);
            }
        }
        Ok(caseloads)
    }
}

impl Matching for Caseload {
    fn run<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        signallers: Vec<Agent>,
        responders: &mut [Agent],
        rounds: u32,
        rng: &mut R,
    ) -> Result<Vec<Agent>, MatchingError> {
        let mut finished = Vec::with_capacity(signallers.len());
        if signallers.is_empty() {
            return Ok(finished);
        }
        let mut caseloads = Self::assign(signallers, responders.len(), rng)?;
        info!(
            responders = responders.len(),
            largest = caseloads.iter().map(VecDeque::len).max().unwrap_or(0),
            "Caseloads assigned"
        );

        while !all_played_caseload(&caseloads, rounds) {
            for (responder, cases) in responders.iter_mut().zip(caseloads.iter_mut()) {
                let Some(mut signaller) = cases.pop_front() else {
                    continue;
                };
                game.play_game(&mut signaller, responder, rng)?;
                if signaller.rounds() >= rounds || signaller.is_finished() {
                    finished.push(signaller);
                } else {
                    cases.push_back(signaller);
                }
            }
        }
        finished.extend(caseloads.into_iter().flatten());
        Ok(finished)
    }
}

// ---------------------------------------------------------------------------
// EqualRounds
// ---------------------------------------------------------------------------

/// Every signaller plays every round against a freshly shuffled partner.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualRounds;

impl Matching for EqualRounds {
    fn run<R: Rng + ?Sized>(
        &self,
        game: &mut Game,
        signallers: Vec<Agent>,
        responders: &mut [Agent],
        rounds: u32,
        rng: &mut R,
    ) -> Result<Vec<Agent>, MatchingError> {
        if responders.len() < signallers.len() {
            return Err(MatchingError::NotEnoughResponders {
                signallers: signallers.len(),
                responders: responders.len(),
            });
        }
        let mut signallers = signallers;
        for _ in 0..rounds {
            signallers.shuffle(rng);
            responders.shuffle(rng);
            for (signaller, responder) in signallers.iter_mut().zip(responders.iter_mut()) {
                game.play_game(signaller, responder, rng)?;
            }
        }
        Ok(signallers)
    }
}

// ---------------------------------------------------------------------------
// MatchingPolicy
// ---------------------------------------------------------------------------

/// Configurable choice of pairing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingPolicy {
    /// [`RandomPairing`].
    #[default]
    Random,
    /// [`Caseload`].
    Caseload,
    /// [`EqualRounds`].
    EqualRounds,
}

impl MatchingPolicy {
    /// Short name for logs and reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Caseload => "caseload",
            Self::EqualRounds => "equal_rounds",
        }
    }

    /// Run the selected policy.
    ///
    /// # Errors
    ///
    /// Propagates the policy's [`MatchingError`].
    pub fn run<R: Rng + ?Sized>(
        self,
        game: &mut Game,
        signallers: Vec<Agent>,
        responders: &mut [Agent],
        rounds: u32,
        rng: &mut R,
    ) -> Result<Vec<Agent>, MatchingError> {
        info!(
            policy = self.name(),
            signallers = signallers.len(),
            responders = responders.len(),
            rounds,
            "Matching started"
        );
        let finished = match self {
            Self::Random => RandomPairing.run(game, signallers, responders, rounds, rng),
            Self::Caseload => Caseload.run(game, signallers, responders, rounds, rng),
            Self::EqualRounds => EqualRounds.run(game, signallers, responders, rounds, rng),
        }?;
        info!(
            policy = self.name(),
            finished = finished.len(),
            rounds_played = game.rounds_played(),
            "Matching complete"
        );
        Ok(finished)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use signalling_agents::{DecisionRule, PayoffParams, TieBreak};
    use signalling_types::PerType;

    use super::*;
    use crate::game::Priors;
    use crate::population::{Cohort, make_responders, make_signallers};

    fn cohort(size: usize) -> Cohort {
        Cohort {
            size,
            weights: PerType::uniform(1.0),
            rule: DecisionRule::Bayesian,
            tie_break: TieBreak::Random,
        }
    }

    fn setup(signallers: usize, responders: usize, rounds: u32) -> (Game, Vec<Agent>, Vec<Agent>, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(21);
        let game = Game::new(PayoffParams::default(), 1, Priors::default()).unwrap();
        let s = make_signallers(&cohort(signallers), rounds, &mut rng).unwrap();
        let r = make_responders(&cohort(responders), &mut rng).unwrap();
        (game, s, r, rng)
    }

    #[test]
    fn caseload_assignment_covers_everyone() {
        let (_, signallers, _, mut rng) = setup(23, 5, 2);
        let caseloads = Caseload::assign(signallers, 5, &mut rng).unwrap();
        assert_eq!(caseloads.len(), 5);
        assert_eq!(caseloads.iter().map(VecDeque::len).sum::<usize>(), 23);
        assert!(caseloads.iter().all(|cases| cases.len() >= 4));
        assert!(!all_played_caseload(&caseloads, 2));
    }

    #[test]
    fn caseload_keeps_signallers_with_one_responder() {
        let (mut game, signallers, mut responders, mut rng) = setup(12, 3, 4);
        let finished = Caseload
            .run(&mut game, signallers, &mut responders, 4, &mut rng)
            .unwrap();
        assert_eq!(finished.len(), 12);
        assert!(all_played(&finished, 4));
        for signaller in &finished {
            let partners: std::collections::BTreeSet<_> = game
                .records()
                .iter()
                .filter(|r| r.signaller_id == signaller.id())
                .map(|r| r.responder_id)
                .collect();
            assert_eq!(partners.len(), 1);
        }
    }

    #[test]
    fn equal_rounds_requires_enough_responders() {
        let (mut game, signallers, mut responders, mut rng) = setup(4, 2, 3);
        let err = EqualRounds.run(&mut game, signallers, &mut responders, 3, &mut rng);
        assert_eq!(
            err.err(),
            Some(MatchingError::NotEnoughResponders {
                signallers: 4,
                responders: 2
            })
        );
    }

    #[test]
    fn equal_rounds_gives_everyone_every_round() {
        let (mut game, signallers, mut responders, mut rng) = setup(4, 6, 3);
        let finished = EqualRounds
            .run(&mut game, signallers, &mut responders, 3, &mut rng)
            .unwrap();
        assert_eq!(finished.len(), 4);
        assert!(finished.iter().all(|s| s.rounds() == 3 && s.is_finished()));
        assert_eq!(game.rounds_played(), 12);
    }

    #[test]
    fn random_pairing_without_responders_fails() {
        let (mut game, signallers, _, mut rng) = setup(3, 1, 2);
        let err = RandomPairing.run(&mut game, signallers, &mut [], 2, &mut rng);
        assert!(matches!(err, Err(MatchingError::NoResponders { signallers: 3 })));
    }
}
