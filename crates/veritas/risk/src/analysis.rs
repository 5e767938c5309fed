//! Per-cluster assessment record handed to the downstream labeler.

use crate::policy::{Recommendation, RiskFlags, RiskLevel};
use serde::{Deserialize, Serialize};
use veritas_signals::{ContradictionSignal, CredibilitySignal, EvolutionSignal, GrowthSignal};
use veritas_types::ClusterId;

/// Combined risk assessment of one cluster, with each signal's evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    pub cluster_id: ClusterId,
    pub datapoint_count: usize,
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub flags: RiskFlags,
    pub flag_count: usize,
    pub growth_analysis: GrowthSignal,
    pub credibility_analysis: CredibilitySignal,
    pub contradiction_analysis: ContradictionSignal,
    pub evolution_analysis: EvolutionSignal,
    pub recommendation: Recommendation,
}

impl ClusterAnalysis {
    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}
