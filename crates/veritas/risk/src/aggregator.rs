//! Risk Aggregator: store-backed single-cluster and batch analysis.

use crate::analysis::ClusterAnalysis;
use crate::batch::{BatchEntry, BatchReport};
use crate::engine::RiskEngine;
use crate::error::RiskResult;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use veritas_store::{DatapointStore, RecentQuery};
use veritas_types::{ClusterId, InputError};

/// Clusters analyzed at once by [`RiskAggregator::analyze_all`] unless overridden.
pub const DEFAULT_MAX_CONCURRENT_CLUSTERS: usize = 4;

/// Reads cluster membership from the store and assesses it.
pub struct RiskAggregator {
    store: Arc<dyn DatapointStore>,
    engine: Arc<RiskEngine>,
    max_concurrent_clusters: usize,
}

impl RiskAggregator {
    pub fn new(store: Arc<dyn DatapointStore>, engine: RiskEngine) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
            max_concurrent_clusters: DEFAULT_MAX_CONCURRENT_CLUSTERS,
        }
    }

    /// Bound on clusters in flight during a batch. Zero is treated as one.
    pub fn with_max_concurrent_clusters(mut self, limit: usize) -> Self {
        self.max_concurrent_clusters = limit.max(1);
        self
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    pub fn max_concurrent_clusters(&self) -> usize {
        self.max_concurrent_clusters
    }

    /// Assess every current member of `cluster_id`.
    #[instrument(skip(self, cluster_id), fields(cluster_id = %cluster_id))]
    pub async fn analyze_cluster(&self, cluster_id: &ClusterId) -> RiskResult<ClusterAnalysis> {
        let members = self.store.get_by_cluster(cluster_id).await?;
        if members.is_empty() {
            warn!(cluster_id = %cluster_id, "cluster has no members");
            return Err(InputError::EmptyCluster(cluster_id.clone()).into());
        }

        let analysis = self
            .engine
            .assess_concurrent(cluster_id.clone(), Arc::from(members))
            .await?;

        info!(
            cluster_id = %cluster_id,
            overall = analysis.overall_risk_score,
            level = %analysis.risk_level,
            flags = analysis.flag_count,
            "cluster analyzed"
        );
        Ok(analysis)
    }

    /// Analyze every cluster with at least `min_cluster_size` members among
    /// the datapoints published in the last `hours`.
    ///
    /// A failing cluster is logged and recorded in the report; it never
    /// aborts the batch. Only the initial read of recent datapoints can fail
    /// the whole call.
    #[instrument(skip(self))]
    pub async fn analyze_all(&self, hours: u32, min_cluster_size: usize) -> RiskResult<BatchReport> {
        let recent = self.store.get_recent(RecentQuery::hours(hours)).await?;

        let mut sizes: BTreeMap<ClusterId, usize> = BTreeMap::new();
        for datapoint in &recent {
            if let Some(cluster_id) = &datapoint.cluster_id {
                *sizes.entry(cluster_id.clone()).or_default() += 1;
            }
        }
        let targets: Vec<ClusterId> = sizes
            .into_iter()
            .filter(|(_, size)| *size >= min_cluster_size)
            .map(|(id, _)| id)
            .collect();

        if targets.is_empty() {
            warn!(hours, min_cluster_size, "no clusters to analyze");
            return Ok(BatchReport::from_entries(Vec::new()));
        }
        info!(
            clusters = targets.len(),
            concurrency = self.max_concurrent_clusters,
            "analyzing clusters"
        );

        let entries: Vec<BatchEntry> = stream::iter(targets)
            .map(|cluster_id| async move {
                match self.analyze_cluster(&cluster_id).await {
                    Ok(analysis) => BatchEntry::Analyzed(analysis),
                    Err(e) => {
                        error!(cluster_id = %cluster_id, error = %e, "cluster analysis failed");
                        BatchEntry::Failed {
                            cluster_id,
                            error: e.to_string(),
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent_clusters)
            .collect()
            .await;

        let report = BatchReport::from_entries(entries);
        info!(
            analyzed = report.total_clusters_analyzed,
            high = report.high_risk_count,
            medium = report.medium_risk_count,
            low = report.low_risk_count,
            failed = report.failed_count,
            "batch complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskError;
    use chrono::{Duration, TimeZone, Utc};
    use veritas_store::InMemoryDatapointStore;
    use veritas_types::Datapoint;

    fn member(id: &str, cluster: &str, hours_ago: i64) -> Datapoint {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut dp = Datapoint::new(id, "Harbor bridge closure")
            .with_source("Reuters")
            .with_published_at(now - Duration::hours(hours_ago));
        dp.cluster_id = Some(ClusterId::new(cluster));
        dp.clustered = true;
        dp
    }

    fn aggregator(points: Vec<Datapoint>) -> RiskAggregator {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let store = InMemoryDatapointStore::pinned_at(now).with_datapoints(points);
        RiskAggregator::new(Arc::new(store), RiskEngine::default())
    }

    #[tokio::test]
    async fn unknown_cluster_is_empty() {
        let agg = aggregator(vec![member("a", "cluster_0", 1)]);
        let err = agg.analyze_cluster(&ClusterId::new("cluster_9")).await.unwrap_err();
        assert!(matches!(err, RiskError::Input(InputError::EmptyCluster(_))));
    }

    #[tokio::test]
    async fn analyze_cluster_reads_full_membership() {
        // one member is outside any recent window but still belongs to the cluster
        let agg = aggregator(vec![
            member("a", "cluster_0", 1),
            member("b", "cluster_0", 2),
            member("c", "cluster_0", 500),
        ]);
        let analysis = agg.analyze_cluster(&ClusterId::new("cluster_0")).await.unwrap();
        assert_eq!(analysis.datapoint_count, 3);
    }

    #[tokio::test]
    async fn batch_filters_by_recent_cluster_size() {
        let agg = aggregator(vec![
            member("a", "cluster_0", 1),
            member("b", "cluster_0", 2),
            member("c", "cluster_1", 3),
            member("d", "cluster_2", 400),
            member("e", "cluster_2", 401),
        ]);
        let report = agg.analyze_all(24, 2).await.unwrap();
        assert_eq!(report.total_clusters_analyzed, 1);
        assert_eq!(report.entries[0].cluster_id(), &ClusterId::new("cluster_0"));
    }

    #[tokio::test]
    async fn unbounded_look_back_covers_all_history() {
        let agg = aggregator(vec![
            member("a", "cluster_0", 1),
            member("b", "cluster_0", 90_000),
        ]);
        let report = agg.analyze_all(u32::MAX, 1).await.unwrap();
        assert_eq!(report.total_clusters_analyzed, 1);
        assert_eq!(report.failed_count, 0);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_report() {
        let report = aggregator(Vec::new()).analyze_all(24, 1).await.unwrap();
        assert_eq!(report.total_clusters_analyzed, 0);
        assert_eq!(report.average_risk_score, 0.0);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let agg = aggregator(Vec::new()).with_max_concurrent_clusters(0);
        assert_eq!(agg.max_concurrent_clusters(), 1);
    }
}
