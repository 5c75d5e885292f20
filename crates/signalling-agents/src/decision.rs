//! Decision rules.
//!
//! A [`DecisionRule`] scores every candidate action from the prospects the
//! agent's beliefs attach to it, and picks the extremal one. Signallers
//! pass one candidate per signal (prospects: the payoffs believed to follow
//! that signal); responders pass one candidate per response (prospects: the
//! payoff against each possible signaller type, weighted by the believed
//! probability of that type given the observed signal).
//!
//! | rule | score | best |
//! |------|-------|------|
//! | Bayesian | `sum(-v * p)` | minimum |
//! | Prospect theory | `-sum((ref + v) * w(p))` | minimum |
//! | Cumulative prospect theory | rank-weighted `sum(value(v) * weight)` | maximum |
//! | Minimax | worst payoff, beliefs ignored | maximum |
//!
//! Rules never fail at decision time. If no candidate produces a finite
//! score the first candidate is chosen and a warning is logged.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RuleError;
use crate::valuation::{CptParams, Prospect};
use crate::weighting::ProbabilityWeighting;

/// How equally scored actions are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the first action in enumeration order.
    #[default]
    First,
    /// Visit actions in a freshly shuffled order and keep the first of the
    /// tied ones visited, so each tied action is equally likely.
    Random,
}

/// Where the prospect-theory reference point sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Sum of every payoff received so far.
    Cumulative,
    /// The payoff received last round (0 before the first round).
    #[default]
    PreviousPayoff,
    /// The prospect's own floor when it has one, otherwise the worst payoff
    /// the candidate action can produce.
    WorstCase,
}

impl ReferenceMode {
    /// Look up a mode by its numeric code (0, 1, 2).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Cumulative),
            1 => Some(Self::PreviousPayoff),
            2 => Some(Self::WorstCase),
            _ => None,
        }
    }

    /// The reference point for `prospect`, one of a candidate's
    /// `prospects`, given the agent's realised payoffs so far.
    pub fn reference_point(
        self,
        prospect: &Prospect,
        prospects: &[Prospect],
        payoff_log: &[f64],
    ) -> f64 {
        match self {
            Self::Cumulative => payoff_log.iter().sum(),
            Self::PreviousPayoff => payoff_log.last().copied().unwrap_or(0.0),
            Self::WorstCase => prospect
                .floor
                .or_else(|| worst_payoff(prospects))
                .unwrap_or(0.0),
        }
    }
}

/// Single-reference prospect theory settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProspectTheory {
    /// Probability weighting function.
    #[serde(default)]
    pub weighting: ProbabilityWeighting,
    /// Reference point selection.
    #[serde(default)]
    pub reference: ReferenceMode,
}

/// A candidate action and the prospects believed to follow from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<A> {
    /// The action.
    pub action: A,
    /// Every payoff the action can lead to, with its believed probability.
    pub prospects: Vec<Prospect>,
}

/// The action a rule picked and the score it picked it with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice<A> {
    /// The chosen action.
    pub action: A,
    /// The rule's score for that action.
    pub score: f64,
}

// ---------------------------------------------------------------------------
// DecisionRule
// ---------------------------------------------------------------------------

/// A strategy mapping beliefs to an action.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DecisionRule {
    /// Minimise Bayes risk.
    #[default]
    Bayesian,
    /// Minimise negated single-reference prospect utility.
    ProspectTheory(ProspectTheory),
    /// Maximise rank-dependent CPT value.
    CumulativeProspectTheory(CptParams),
    /// Maximise the worst-case payoff.
    Minimax,
}

impl DecisionRule {
    /// Short name for logs and reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bayesian => "bayesian",
            Self::ProspectTheory(_) => "prospect_theory",
            Self::CumulativeProspectTheory(_) => "cumulative_prospect_theory",
            Self::Minimax => "minimax",
        }
    }

    /// Check the rule's parameters.
    pub fn validate(&self) -> Result<(), RuleError> {
        match self {
            Self::Bayesian | Self::Minimax => Ok(()),
            Self::ProspectTheory(pt) => pt.weighting.validate(),
            Self::CumulativeProspectTheory(params) => params.validate(),
        }
    }

    /// Whether lower scores are better under this rule.
    const fn minimises(&self) -> bool {
        matches!(self, Self::Bayesian | Self::ProspectTheory(_))
    }

    /// Score one candidate's prospects.
    pub fn score(&self, prospects: &[Prospect], payoff_log: &[f64]) -> f64 {
        match self {
            Self::Bayesian => prospects.iter().map(|p| -p.payoff * p.probability).sum(),
            Self::ProspectTheory(pt) => {
                let utility: f64 = prospects
                    .iter()
                    .map(|p| {
                        let reference = pt.reference.reference_point(p, prospects, payoff_log);
                        (reference + p.payoff) * pt.weighting.weight(p.probability)
                    })
                    .sum();
                -utility
            }
            Self::CumulativeProspectTheory(params) => params.cpt_value(prospects),
            Self::Minimax => worst_payoff(prospects).unwrap_or(f64::NEG_INFINITY),
        }
    }

    fn improves(&self, score: f64, best: f64) -> bool {
        if self.minimises() {
            score < best
        } else {
            score > best
        }
    }

    /// Pick the best candidate.
    ///
    /// Only a strict improvement replaces the incumbent, so among tied
    /// candidates the first one visited wins; `tie_break` decides the visiting
    /// order. Candidates with a non-finite score are never chosen unless no
    /// candidate scores finitely, in which case the first candidate is
    /// returned. Returns `None` only for an empty candidate list.
    pub fn choose<A: Copy, R: Rng + ?Sized>(
        &self,
        candidates: &[Candidate<A>],
        payoff_log: &[f64],
        tie_break: TieBreak,
        rng: &mut R,
    ) -> Option<Choice<A>> {
        let mut order: Vec<&Candidate<A>> = candidates.iter().collect();
        if tie_break == TieBreak::Random {
            order.shuffle(rng);
        }

        let mut best: Option<Choice<A>> = None;
        for candidate in order {
            let score = self.score(&candidate.prospects, payoff_log);
            if !score.is_finite() {
                continue;
            }
            if best.is_none_or(|incumbent| self.improves(score, incumbent.score)) {
                best = Some(Choice {
                    action: candidate.action,
                    score,
                });
            }
        }

        best.or_else(|| {
            let first = candidates.first()?;
            warn!(
                rule = self.name(),
                candidates = candidates.len(),
                "no candidate scored finitely, falling back to the first action"
            );
            Some(Choice {
                action: first.action,
                score: self.score(&first.prospects, payoff_log),
            })
        })
    }
}

fn worst_payoff(prospects: &[Prospect]) -> Option<f64> {
    prospects.iter().map(|p| p.payoff).reduce(f64::min)
}
