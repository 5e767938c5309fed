//! Per-cluster risk assessment.
//!
//! The four analyzers share no state, so a cluster can be assessed either
//! sequentially or fanned out across tokio's blocking pool. Both paths feed
//! the same combination step and produce identical records.

use crate::analysis::ClusterAnalysis;
use crate::error::RiskResult;
use crate::policy::{RiskFlags, RiskPolicy};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};
use veritas_signals::{
    ContradictionAnalyzer, ContradictionSignal, CredibilityAnalyzer, CredibilitySignal,
    EvolutionAnalyzer, EvolutionSignal, GrowthAnalyzer, GrowthSignal, SignalAnalyzer,
};
use veritas_types::{ClusterId, Datapoint, InputError, InputResult};

/// Runs the four signal analyzers and combines them under a [`RiskPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    growth: Arc<GrowthAnalyzer>,
    credibility: Arc<CredibilityAnalyzer>,
    contradiction: Arc<ContradictionAnalyzer>,
    evolution: Arc<EvolutionAnalyzer>,
    policy: RiskPolicy,
}

impl RiskEngine {
    pub fn new(
        growth: GrowthAnalyzer,
        credibility: CredibilityAnalyzer,
        contradiction: ContradictionAnalyzer,
        evolution: EvolutionAnalyzer,
        policy: RiskPolicy,
    ) -> InputResult<Self> {
        policy.validate()?;
        Ok(Self {
            growth: Arc::new(growth),
            credibility: Arc::new(credibility),
            contradiction: Arc::new(contradiction),
            evolution: Arc::new(evolution),
            policy,
        })
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Assess one cluster on the calling thread.
    pub fn assess(
        &self,
        cluster_id: &ClusterId,
        members: &[Datapoint],
    ) -> InputResult<ClusterAnalysis> {
        if members.is_empty() {
            return Err(InputError::EmptyCluster(cluster_id.clone()));
        }
        Ok(self.combine(
            cluster_id.clone(),
            members.len(),
            self.growth.analyze(members)?,
            self.credibility.analyze(members)?,
            self.contradiction.analyze(members)?,
            self.evolution.analyze(members)?,
        ))
    }

    /// Assess one cluster with each analyzer on its own blocking task.
    #[instrument(skip(self, members), fields(datapoints = members.len()))]
    pub async fn assess_concurrent(
        &self,
        cluster_id: ClusterId,
        members: Arc<[Datapoint]>,
    ) -> RiskResult<ClusterAnalysis> {
        if members.is_empty() {
            return Err(InputError::EmptyCluster(cluster_id).into());
        }

        let (growth, credibility, contradiction, evolution) = tokio::try_join!(
            spawn_signal(Arc::clone(&self.growth), Arc::clone(&members)),
            spawn_signal(Arc::clone(&self.credibility), Arc::clone(&members)),
            spawn_signal(Arc::clone(&self.contradiction), Arc::clone(&members)),
            spawn_signal(Arc::clone(&self.evolution), Arc::clone(&members)),
        )?;

        Ok(self.combine(
            cluster_id,
            members.len(),
            growth?,
            credibility?,
            contradiction?,
            evolution?,
        ))
    }

    fn combine(
        &self,
        cluster_id: ClusterId,
        datapoint_count: usize,
        growth: GrowthSignal,
        credibility: CredibilitySignal,
        contradiction: ContradictionSignal,
        evolution: EvolutionSignal,
    ) -> ClusterAnalysis {
        let p = &self.policy;
        let overall = p.weights.combine(
            growth.risk_score,
            credibility.risk_score,
            contradiction.risk_score,
            evolution.risk_score,
        );

        let min_ratio = self.credibility.table().min_credible_ratio;
        let flags = RiskFlags {
            rapid_growth: growth.is_rapid_growth,
            low_credibility: credibility.credible_ratio < p.low_credibility_factor * min_ratio,
            has_contradictions: contradiction.has_contradictions
                && contradiction.contradiction_count > p.contradiction_flag_count,
            narrative_evolution: evolution.has_evolution
                && evolution.change_count > p.evolution_flag_count,
        };

        ClusterAnalysis {
            cluster_id,
            datapoint_count,
            overall_risk_score: overall,
            risk_level: p.level(overall),
            flag_count: flags.count(),
            recommendation: p.recommend(overall, &flags),
            flags,
            growth_analysis: growth,
            credibility_analysis: credibility,
            contradiction_analysis: contradiction,
            evolution_analysis: evolution,
        }
    }
}

fn spawn_signal<A>(analyzer: Arc<A>, members: Arc<[Datapoint]>) -> JoinHandle<InputResult<A::Signal>>
where
    A: SignalAnalyzer + 'static,
{
    tokio::task::spawn_blocking(move || {
        let signal = analyzer.analyze(&members);
        debug!(analyzer = analyzer.name(), ok = signal.is_ok(), "signal computed");
        signal
    })
}
