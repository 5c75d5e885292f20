//! Probability weighting functions.
//!
//! Prospect theory replaces objective probabilities with decision weights
//! that overweight unlikely outcomes and underweight likely ones. Two
//! standard one-parameter families are provided, plus the identity.
//!
//! Both families are special-cased at the boundaries: `w(0) = 0` and
//! `w(1) = 1` exactly, so neither `0^0` nor `ln(0)` is ever evaluated.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Tversky-Kahneman (1992) weighting `p^g / (p^g + (1-p)^g)^(1/g)`.
pub fn tversky_kahneman(p: f64, gamma: f64) -> f64 {
    if let Some(edge) = boundary(p) {
        return edge;
    }
    let numerator = p.powf(gamma);
    numerator / (numerator + (1.0 - p).powf(gamma)).powf(1.0 / gamma)
}

/// Prelec (1998) weighting `exp(-beta * (-ln p)^alpha)`.
pub fn prelec(p: f64, alpha: f64, beta: f64) -> f64 {
    if let Some(edge) = boundary(p) {
        return edge;
    }
    (-beta * (-p.ln()).powf(alpha)).exp()
}

/// Exact weights at and beyond the ends of `[0, 1]`.
fn boundary(p: f64) -> Option<f64> {
    if p.is_nan() || p <= 0.0 {
        Some(0.0)
    } else if p >= 1.0 {
        Some(1.0)
    } else {
        None
    }
}

/// A swappable probability weighting function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbabilityWeighting {
    /// Objective probabilities, clamped to `[0, 1]`.
    Identity,
    /// Tversky-Kahneman inverse-S weighting.
    TverskyKahneman {
        /// Curvature; 1 recovers the identity.
        gamma: f64,
    },
    /// Prelec compound-invariant weighting.
    Prelec {
        /// Curvature.
        alpha: f64,
        /// Elevation.
        beta: f64,
    },
}

impl Default for ProbabilityWeighting {
    fn default() -> Self {
        Self::TverskyKahneman { gamma: 0.5 }
    }
}

impl ProbabilityWeighting {
    /// Weight a probability.
    pub fn weight(&self, p: f64) -> f64 {
        match *self {
            Self::Identity => boundary(p).unwrap_or(p),
            Self::TverskyKahneman { gamma } => tversky_kahneman(p, gamma),
            Self::Prelec { alpha, beta } => prelec(p, alpha, beta),
        }
    }

    /// Check that every parameter is finite and strictly positive.
    pub fn validate(&self) -> Result<(), RuleError> {
        match *self {
            Self::Identity => Ok(()),
            Self::TverskyKahneman { gamma } => RuleError::require_positive("gamma", gamma),
            Self::Prelec { alpha, beta } => {
                RuleError::require_positive("alpha", alpha)?;
                RuleError::require_positive("beta", beta)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        for weighting in [
            ProbabilityWeighting::Identity,
            ProbabilityWeighting::TverskyKahneman { gamma: 0.61 },
            ProbabilityWeighting::Prelec {
                alpha: 0.65,
                beta: 1.0,
            },
        ] {
            assert_eq!(weighting.weight(0.0), 0.0);
            assert_eq!(weighting.weight(1.0), 1.0);
            assert_eq!(weighting.weight(-0.5), 0.0);
            assert_eq!(weighting.weight(1.5), 1.0);
            assert_eq!(weighting.weight(f64::NAN), 0.0);
        }
    }

    #[test]
    fn tversky_kahneman_overweights_small_probabilities() {
        let w = tversky_kahneman(0.05, 0.61);
        assert!(w > 0.05);
        let w = tversky_kahneman(0.9, 0.61);
        assert!(w < 0.9);
    }

    #[test]
    fn tversky_kahneman_gamma_one_is_identity() {
        for p in [0.1, 0.25, 0.5, 0.75] {
            assert!((tversky_kahneman(p, 1.0) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn prelec_fixed_point_at_inverse_e() {
        // With beta = 1 every alpha crosses the diagonal at p = 1/e.
        let p = (-1.0_f64).exp();
        assert!((prelec(p, 0.5, 1.0) - p).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_non_positive_parameters() {
        assert!(ProbabilityWeighting::TverskyKahneman { gamma: 0.0 }.validate().is_err());
        assert!(
            ProbabilityWeighting::Prelec {
                alpha: 1.0,
                beta: f64::INFINITY
            }
            .validate()
            .is_err()
        );
        assert!(ProbabilityWeighting::default().validate().is_ok());
    }

    #[test]
    fn deserializes_tagged() {
        let w: Result<ProbabilityWeighting, _> =
            serde_json::from_str(r#"{"kind": "prelec", "alpha": 0.5, "beta": 1.0}"#);
        assert_eq!(
            w.ok(),
            Some(ProbabilityWeighting::Prelec {
                alpha: 0.5,
                beta: 1.0
            })
        );
    }
}
