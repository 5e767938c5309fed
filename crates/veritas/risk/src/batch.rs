//! Batch analysis results.

use crate::analysis::ClusterAnalysis;
use crate::policy::RiskLevel;
use serde::{Deserialize, Serialize};
use veritas_types::ClusterId;

/// Outcome for one cluster of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Analyzed(ClusterAnalysis),
    Failed { cluster_id: ClusterId, error: String },
}

impl BatchEntry {
    pub fn cluster_id(&self) -> &ClusterId {
        match self {
            Self::Analyzed(analysis) => &analysis.cluster_id,
            Self::Failed { cluster_id, .. } => cluster_id,
        }
    }

    pub fn analysis(&self) -> Option<&ClusterAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            Self::Failed { .. } => None,
        }
    }
}

/// Summary of a batch run. Level counts and the mean cover successful
/// analyses only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_clusters_analyzed: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub failed_count: usize,
    pub average_risk_score: f64,
    pub high_risk_cluster_ids: Vec<ClusterId>,
    /// Every entry, ordered by cluster id.
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn from_entries(mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| a.cluster_id().cmp(b.cluster_id()));

        let (mut high, mut medium, mut low) = (0, 0, 0);
        let mut total_score = 0.0;
        let mut high_risk_cluster_ids = Vec::new();
        for analysis in entries.iter().filter_map(BatchEntry::analysis) {
            total_score += analysis.overall_risk_score;
            match analysis.risk_level {
                RiskLevel::High => {
                    high += 1;
                    high_risk_cluster_ids.push(analysis.cluster_id.clone());
                }
                RiskLevel::Medium => medium += 1,
                RiskLevel::Low => low += 1,
            }
        }

        let analyzed = high + medium + low;
        Self {
            total_clusters_analyzed: entries.len(),
            high_risk_count: high,
            medium_risk_count: medium,
            low_risk_count: low,
            failed_count: entries.len() - analyzed,
            average_risk_score: if analyzed == 0 {
                0.0
            } else {
                total_score / analyzed as f64
            },
            high_risk_cluster_ids,
            entries,
        }
    }

    /// Successful analyses scoring at least `threshold`, highest first.
    pub fn above_threshold(&self, threshold: f64) -> Vec<&ClusterAnalysis> {
        let mut hits: Vec<&ClusterAnalysis> = self
            .entries
            .iter()
            .filter_map(BatchEntry::analysis)
            .filter(|a| a.overall_risk_score >= threshold)
            .collect();
        hits.sort_by(|a, b| {
            b.overall_risk_score
                .total_cmp(&a.overall_risk_score)
                .then_with(|| a.cluster_id.cmp(&b.cluster_id))
        });
        hits
    }
}
