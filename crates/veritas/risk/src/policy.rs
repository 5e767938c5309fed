//! Risk calibration policy.
//!
//! The weights, level cut-offs and flag thresholds are product-tuned
//! calibration values rather than statistically derived constants. They are
//! exposed as configuration so deployments can retune them; the defaults
//! reproduce the reference behaviour exactly.

use serde::{Deserialize, Serialize};
use veritas_types::{InputError, InputResult};

/// Slack for floating-point error when summing weights.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Weight of each signal in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub growth: f64,
    pub credibility: f64,
    pub contradiction: f64,
    pub evolution: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            growth: 0.1,
            credibility: 0.4,
            contradiction: 0.3,
            evolution: 0.2,
        }
    }
}

impl SignalWeights {
    /// Weighted sum of the four sub-scores, clamped to `[0, 1]`.
    pub fn combine(&self, growth: f64, credibility: f64, contradiction: f64, evolution: f64) -> f64 {
        let sum = self.growth * growth
            + self.credibility * credibility
            + self.contradiction * contradiction
            + self.evolution * evolution;
        if sum.is_nan() {
            0.0
        } else {
            sum.clamp(0.0, 1.0)
        }
    }

    pub fn total(&self) -> f64 {
        self.growth + self.credibility + self.contradiction + self.evolution
    }
}

/// Triage bucket of an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Suggested handling for a cluster. The downstream labeler turns this into prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ImmediateReview,
    Review,
    Monitor,
    LikelyLegitimate,
}

/// Aggregate flags, stricter than the analyzers' own booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    pub rapid_growth: bool,
    pub low_credibility: bool,
    pub has_contradictions: bool,
    pub narrative_evolution: bool,
}

impl RiskFlags {
    /// Number of raised flags (0 to 4).
    pub fn count(&self) -> usize {
        [
            self.rapid_growth,
            self.low_credibility,
            self.has_contradictions,
            self.narrative_evolution,
        ]
        .iter()
        .filter(|f| **f)
        .count()
    }
}

/// Risk aggregation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub weights: SignalWeights,
    /// Scores at or above this are high risk.
    pub high_threshold: f64,
    /// Scores at or above this (and below high) are medium risk.
    pub medium_threshold: f64,
    /// Score at or above which a cluster needs immediate review.
    pub immediate_review_threshold: f64,
    /// Score at or above which a cluster needs review.
    pub review_threshold: f64,
    /// `low_credibility` is raised when the credible ratio falls below
    /// this fraction of the configured minimum ratio.
    pub low_credibility_factor: f64,
    /// `has_contradictions` needs strictly more pairs than this.
    pub contradiction_flag_count: usize,
    /// `narrative_evolution` needs strictly more changes than this.
    pub evolution_flag_count: usize,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            high_threshold: 0.6,
            medium_threshold: 0.35,
            immediate_review_threshold: 0.7,
            review_threshold: 0.4,
            low_credibility_factor: 0.7,
            contradiction_flag_count: 2,
            evolution_flag_count: 2,
        }
    }
}

impl RiskPolicy {
    /// Bucket an overall score. Boundaries belong to the higher tier.
    pub fn level(&self, overall: f64) -> RiskLevel {
        if overall >= self.high_threshold {
            RiskLevel::High
        } else if overall >= self.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn recommend(&self, overall: f64, flags: &RiskFlags) -> Recommendation {
        if overall >= self.immediate_review_threshold {
            Recommendation::ImmediateReview
        } else if overall >= self.review_threshold {
            Recommendation::Review
        } else if flags.rapid_growth || flags.has_contradictions {
            Recommendation::Monitor
        } else {
            Recommendation::LikelyLegitimate
        }
    }

    pub fn validate(&self) -> InputResult<()> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.growth", w.growth),
            ("weights.credibility", w.credibility),
            ("weights.contradiction", w.contradiction),
            ("weights.evolution", w.evolution),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::InvalidParameter {
                    name,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        if w.total() > 1.0 + WEIGHT_TOLERANCE {
            return Err(InputError::InvalidParameter {
                name: "weights",
                reason: format!("must sum to at most 1, got {}", w.total()),
            });
        }
        if !self.medium_threshold.is_finite() || self.medium_threshold > self.high_threshold {
            return Err(InputError::InvalidParameter {
                name: "medium_threshold",
                reason: format!(
                    "must not exceed high_threshold ({} > {})",
                    self.medium_threshold, self.high_threshold
                ),
            });
        }
        if !self.review_threshold.is_finite()
            || self.review_threshold > self.immediate_review_threshold
        {
            return Err(InputError::InvalidParameter {
                name: "review_threshold",
                reason: format!(
                    "must not exceed immediate_review_threshold ({} > {})",
                    self.review_threshold, self.immediate_review_threshold
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries_are_inclusive_upward() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.level(0.6), RiskLevel::High);
        assert_eq!(policy.level(0.599_999), RiskLevel::Medium);
        assert_eq!(policy.level(0.35), RiskLevel::Medium);
        assert_eq!(policy.level(0.349_999), RiskLevel::Low);
        assert_eq!(policy.level(0.0), RiskLevel::Low);
    }

    #[test]
    fn recommendation_tiers() {
        let policy = RiskPolicy::default();
        let quiet = RiskFlags::default();
        let growing = RiskFlags {
            rapid_growth: true,
            ..Default::default()
        };
        let drifting = RiskFlags {
            narrative_evolution: true,
            low_credibility: true,
            ..Default::default()
        };

        assert_eq!(policy.recommend(0.7, &quiet), Recommendation::ImmediateReview);
        assert_eq!(policy.recommend(0.4, &quiet), Recommendation::Review);
        assert_eq!(policy.recommend(0.1, &growing), Recommendation::Monitor);
        // evolution and credibility flags alone do not warrant monitoring
        assert_eq!(policy.recommend(0.1, &drifting), Recommendation::LikelyLegitimate);
    }

    #[test]
    fn default_weights_combine() {
        let w = SignalWeights::default();
        let overall = w.combine(1.0, 0.5, 0.2, 0.1);
        assert!((overall - (0.1 + 0.2 + 0.06 + 0.02)).abs() < 1e-12);
    }

    #[test]
    fn combined_score_stays_in_unit_range() {
        let heavy = SignalWeights {
            credibility: 2.0,
            ..Default::default()
        };
        assert_eq!(heavy.combine(1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(SignalWeights::default().combine(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn overweight_policy_is_rejected() {
        let policy = RiskPolicy {
            weights: SignalWeights {
                credibility: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(InputError::InvalidParameter { name: "weights", .. })
        ));
        assert!((SignalWeights::default().total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flag_count() {
        let flags = RiskFlags {
            rapid_growth: true,
            has_contradictions: true,
            ..Default::default()
        };
        assert_eq!(flags.count(), 2);
        assert_eq!(RiskFlags::default().count(), 0);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let policy = RiskPolicy {
            medium_threshold: 0.8,
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(InputError::InvalidParameter { name: "medium_threshold", .. })
        ));
        let negative = RiskPolicy {
            weights: SignalWeights {
                growth: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        assert!(RiskPolicy::default().validate().is_ok());
    }

    #[test]
    fn recommendation_serializes_snake_case() {
        let json = serde_json::to_string(&Recommendation::ImmediateReview).unwrap();
        assert_eq!(json, "\"immediate_review\"");
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
