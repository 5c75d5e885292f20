//! Cumulative prospect theory valuation.
//!
//! A candidate action is described by its prospects: every payoff it can
//! produce, paired with the believed probability of producing it. CPT
//! values the action by sorting the prospects best-first, transforming
//! cumulative probabilities into rank-dependent decision weights, and
//! summing `value(payoff) * weight`.
//!
//! Gains accumulate from the top of the ranking and losses from the
//! bottom. The outermost prospect of each tail takes `1 - w(1 - p)`, so a
//! prospect list made only of gains (or only of losses) receives weights
//! that sum to one.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::weighting::tversky_kahneman;

/// A payoff and the believed probability of receiving it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    /// The payoff.
    pub payoff: f64,
    /// Believed probability of the payoff.
    pub probability: f64,
    /// Worst payoff of the state this outcome belongs to, across every
    /// action. Used as the worst-case reference point when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
}

impl Prospect {
    /// Create a prospect.
    pub const fn new(payoff: f64, probability: f64) -> Self {
        Self {
            payoff,
            probability,
            floor: None,
        }
    }

    /// Attach the worst payoff of this outcome's state.
    #[must_use]
    pub const fn with_floor(self, floor: f64) -> Self {
        Self {
            floor: Some(floor),
            ..self
        }
    }
}

/// Order prospects best payoff first; equal payoffs by descending probability.
pub fn sort_descending(prospects: &mut [Prospect]) {
    prospects.sort_by(|a, b| descending(a, b));
}

fn descending(a: &Prospect, b: &Prospect) -> Ordering {
    b.payoff
        .total_cmp(&a.payoff)
        .then_with(|| b.probability.total_cmp(&a.probability))
}

/// Rank-dependent decision weights for prospects already sorted best-first.
///
/// `gamma` curves the weighting of gains (including zero), `delta` that of
/// losses. Both use the Tversky-Kahneman form.
pub fn decision_weights(sorted: &[Prospect], gamma: f64, delta: f64) -> Vec<f64> {
    let last = sorted.len().saturating_sub(1);
    let total: f64 = sorted.iter().map(|p| p.probability).sum();
    let mut weights = Vec::with_capacity(sorted.len());
    let mut above = 0.0;

    for (rank, prospect) in sorted.iter().enumerate() {
        let p = prospect.probability;
        let through = above + p;
        let loss = prospect.payoff < 0.0;
        let power = if loss { delta } else { gamma };

        let weight = if (rank == 0 && loss) || (rank == last && !loss) {
            1.0 - tversky_kahneman(1.0 - p, power)
        } else if loss {
            tversky_kahneman(total - above, power) - tversky_kahneman(total - through, power)
        } else {
            tversky_kahneman(through, power) - tversky_kahneman(above, power)
        };

        weights.push(weight);
        above = through;
    }
    weights
}

// ---------------------------------------------------------------------------
// CptParams
// ---------------------------------------------------------------------------

/// Value-curve and weighting parameters for cumulative prospect theory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CptParams {
    /// Gain curvature. Positive: `x^alpha`; negative: `ln x`; zero: `1 - (1 + x)^alpha`.
    pub alpha: f64,
    /// Loss curvature. Positive: `-(-x)^beta`; negative: `(1 - x)^beta - 1`; zero: `-ln(-x)`.
    pub beta: f64,
    /// Loss aversion coefficient.
    pub lambda: f64,
    /// Probability weighting exponent for gains.
    pub gamma: f64,
    /// Probability weighting exponent for losses.
    pub delta: f64,
}

impl CptParams {
    /// Estimates used for signallers.
    pub const fn signaller_default() -> Self {
        Self {
            alpha: 0.859,
            beta: 0.826,
            lambda: 2.25,
            gamma: 0.618,
            delta: 0.592,
        }
    }

    /// Estimates used for responders.
    pub const fn responder_default() -> Self {
        Self {
            alpha: 0.88,
            beta: 0.88,
            lambda: 2.25,
            gamma: 0.61,
            delta: 0.69,
        }
    }

    /// Check that the parameters describe a usable valuation.
    ///
    /// Curvatures only need to be finite; the loss aversion and the two
    /// weighting exponents must be strictly positive.
    pub fn validate(&self) -> Result<(), RuleError> {
        RuleError::require_finite("alpha", self.alpha)?;
        RuleError::require_finite("beta", self.beta)?;
        RuleError::require_positive("lambda", self.lambda)?;
        RuleError::require_positive("gamma", self.gamma)?;
        RuleError::require_positive("delta", self.delta)
    }

    /// Subjective value of a single payoff.
    pub fn value(&self, payoff: f64) -> f64 {
        match payoff.partial_cmp(&0.0) {
            Some(Ordering::Greater) => self.gain_value(payoff),
            Some(Ordering::Less) => self.lambda * self.loss_value(payoff),
            _ => 0.0,
        }
    }

    fn gain_value(&self, payoff: f64) -> f64 {
        if self.alpha > 0.0 {
            payoff.powf(self.alpha)
        } else if self.alpha < 0.0 {
            payoff.ln()
        } else {
            1.0 - (1.0 + payoff).powf(self.alpha)
        }
    }

    fn loss_value(&self, payoff: f64) -> f64 {
        if self.beta > 0.0 {
            -(-payoff).powf(self.beta)
        } else if self.beta < 0.0 {
            (1.0 - payoff).powf(self.beta) - 1.0
        } else {
            -(-payoff).ln()
        }
    }

    /// CPT value of a prospect list in any order.
    pub fn cpt_value(&self, prospects: &[Prospect]) -> f64 {
        let mut sorted = prospects.to_vec();
        sort_descending(&mut sorted);
        let weights = decision_weights(&sorted, self.gamma, self.delta);
        sorted
            .iter()
            .zip(weights)
            .map(|(prospect, weight)| self.value(prospect.payoff) * weight)
            .sum()
    }
}

impl Default for CptParams {
    fn default() -> Self {
        Self::responder_default()
    }
}
