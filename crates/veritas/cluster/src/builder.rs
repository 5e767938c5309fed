//! Cluster Builder: partitioning plus store write-back.

use crate::config::{validate_min_points, ClusterMode, ClusteringConfig};
use crate::dbscan::{partition_density, DensityParams};
use crate::error::ClusterResult;
use crate::greedy::{partition_greedy, GreedyParams};
use crate::similarity::cosine_similarity;
use crate::ClusterMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use veritas_store::{DatapointStore, EmbeddingProvider, RecentQuery};
use veritas_types::{Datapoint, DatapointId, InputError};

/// Options for store-backed clustering runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterRequest {
    /// Algorithm; the builder's configured default when unset.
    pub mode: Option<ClusterMode>,
    /// Overrides `min_points` (density) or the minimum group size (greedy).
    pub min_cluster_size: Option<usize>,
    /// Pull recent datapoints in as clustering context.
    pub include_context: bool,
    /// Context look-back; the configured default when unset.
    pub context_hours: Option<u32>,
    /// Recluster datapoints that already carry an assignment.
    pub force_recluster: bool,
}

impl ClusterRequest {
    pub fn with_mode(mut self, mode: ClusterMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = Some(size);
        self
    }

    pub fn with_context(mut self, hours: Option<u32>) -> Self {
        self.include_context = true;
        self.context_hours = hours;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force_recluster = true;
        self
    }
}

/// A similarity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDatapoint {
    pub datapoint: Datapoint,
    pub similarity: f64,
}

/// Groups datapoints into clusters and persists the assignments.
pub struct ClusterBuilder {
    store: Arc<dyn DatapointStore>,
    config: ClusteringConfig,
}

impl ClusterBuilder {
    /// Create a builder. Fails if the configuration is out of range.
    pub fn new(store: Arc<dyn DatapointStore>, config: ClusteringConfig) -> ClusterResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Density clustering with write-back. `min_points` overrides the configured value.
    #[instrument(skip(self, datapoints), fields(count = datapoints.len()))]
    pub async fn cluster_datapoints(
        &self,
        datapoints: &[Datapoint],
        min_points: Option<usize>,
    ) -> ClusterResult<ClusterMap> {
        let params = DensityParams {
            eps: self.config.eps,
            min_points: min_points.unwrap_or(self.config.min_points),
        };
        let clusters = partition_density(datapoints, params)?;
        self.persist(clusters).await
    }

    /// Greedy clustering with write-back.
    #[instrument(skip(self, datapoints), fields(count = datapoints.len()))]
    pub async fn cluster_datapoints_greedy(
        &self,
        datapoints: &[Datapoint],
        similarity_threshold: f64,
        min_cluster_size: usize,
    ) -> ClusterResult<ClusterMap> {
        let params = GreedyParams {
            similarity_threshold,
            min_cluster_size,
        };
        let clusters = partition_greedy(datapoints, params)?;
        self.persist(clusters).await
    }

    /// Cluster the given ids, optionally alongside recent context.
    ///
    /// Only clusters containing at least one requested id are returned and
    /// written back; they are returned in full, context members included.
    #[instrument(skip(self, ids, request), fields(requested = ids.len()))]
    pub async fn cluster_by_ids(
        &self,
        ids: &[DatapointId],
        request: &ClusterRequest,
    ) -> ClusterResult<ClusterMap> {
        // 1. Resolve requested datapoints that carry embeddings
        let mut seen: BTreeSet<DatapointId> = BTreeSet::new();
        let mut datapoints: Vec<Datapoint> = Vec::with_capacity(ids.len());
        for id in ids {
            if seen.contains(id) {
                continue;
            }
            match self.store.get(id).await? {
                Some(dp) if dp.valid_embedding().is_some() => {
                    seen.insert(dp.id.clone());
                    datapoints.push(dp);
                }
                Some(_) => debug!(datapoint_id = %id, "requested datapoint has no embedding"),
                None => debug!(datapoint_id = %id, "requested datapoint not found"),
            }
        }
        if datapoints.is_empty() {
            return Ok(ClusterMap::new());
        }
        let requested = seen.clone();

        // 2. Union with recent context
        if request.include_context {
            let hours = request.context_hours.unwrap_or(self.config.context_hours);
            let context = self.store.get_recent(RecentQuery::hours(hours)).await?;
            let before = datapoints.len();
            for dp in context {
                if dp.valid_embedding().is_some() && seen.insert(dp.id.clone()) {
                    datapoints.push(dp);
                }
            }
            debug!(context = datapoints.len() - before, hours, "added context datapoints");
        }

        // 3. Partition, then keep clusters touching a requested id
        let clusters: ClusterMap = self
            .partition(&datapoints, request)?
            .into_iter()
            .filter(|(_, members)| members.iter().any(|m| requested.contains(&m.id)))
            .collect();

        self.persist(clusters).await
    }

    /// Cluster recently published datapoints.
    ///
    /// Datapoints already assigned to a cluster are skipped unless the request
    /// forces reclustering.
    #[instrument(skip(self, request))]
    pub async fn cluster_recent(&self, hours: u32, request: &ClusterRequest) -> ClusterResult<ClusterMap> {
        let datapoints: Vec<Datapoint> = self
            .store
            .get_recent(RecentQuery::hours(hours))
            .await?
            .into_iter()
            .filter(|dp| request.force_recluster || !dp.clustered)
            .collect();

        if datapoints.is_empty() {
            info!(hours, "no datapoints to cluster");
            return Ok(ClusterMap::new());
        }

        let clusters = self.partition(&datapoints, request)?;
        self.persist(clusters).await
    }

    /// Recent datapoints most similar to `query`, best first.
    ///
    /// Scans the `limit * 2` newest datapoints with embeddings and keeps those
    /// at or above the configured similarity threshold.
    #[instrument(skip(self, query), fields(dimension = query.len()))]
    pub async fn find_similar(
        &self,
        query: &[f32],
        hours: u32,
        limit: usize,
    ) -> ClusterResult<Vec<SimilarDatapoint>> {
        let candidates = self
            .store
            .get_recent(RecentQuery::hours(hours).with_limit(limit.saturating_mul(2)))
            .await?;

        let mut hits = Vec::new();
        for datapoint in candidates {
            let Some(embedding) = datapoint.valid_embedding() else {
                continue;
            };
            if embedding.len() != query.len() {
                return Err(InputError::DimensionMismatch {
                    datapoint_id: datapoint.id.clone(),
                    expected: query.len(),
                    found: embedding.len(),
                }
                .into());
            }
            let similarity = cosine_similarity(query, embedding);
            if similarity >= self.config.similarity_threshold {
                hits.push(SimilarDatapoint {
                    datapoint,
                    similarity,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.datapoint.id.cmp(&b.datapoint.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    /// Embed `text` and search for similar recent datapoints.
    pub async fn find_similar_text(
        &self,
        provider: &dyn EmbeddingProvider,
        text: &str,
        hours: u32,
        limit: usize,
    ) -> ClusterResult<Vec<SimilarDatapoint>> {
        let query = provider.embed(text).await?;
        self.find_similar(&query, hours, limit).await
    }

    fn partition(&self, datapoints: &[Datapoint], request: &ClusterRequest) -> ClusterResult<ClusterMap> {
        if let Some(size) = request.min_cluster_size {
            validate_min_points("min_cluster_size", size)?;
        }
        let clusters = match request.mode.unwrap_or(self.config.default_mode) {
            ClusterMode::Density => partition_density(
                datapoints,
                DensityParams {
                    eps: self.config.eps,
                    min_points: request.min_cluster_size.unwrap_or(self.config.min_points),
                },
            )?,
            ClusterMode::Greedy => partition_greedy(
                datapoints,
                GreedyParams {
                    similarity_threshold: self.config.greedy_threshold,
                    min_cluster_size: request
                        .min_cluster_size
                        .unwrap_or(self.config.greedy_min_cluster_size),
                },
            )?,
        };
        Ok(clusters)
    }

    /// Write each member's assignment and mirror it on the returned records.
    async fn persist(&self, mut clusters: ClusterMap) -> ClusterResult<ClusterMap> {
        let mut written = 0usize;
        for (cluster_id, members) in clusters.iter_mut() {
            for member in members.iter_mut() {
                self.store.set_cluster(&member.id, cluster_id).await?;
                member.cluster_id = Some(cluster_id.clone());
                member.clustered = true;
                written += 1;
            }
        }
        info!(clusters = clusters.len(), datapoints = written, "clusters persisted");
        Ok(clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use veritas_store::InMemoryDatapointStore;
    use veritas_types::ClusterId;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn dp(id: &str, embedding: Vec<f32>, hours_ago: i64) -> Datapoint {
        Datapoint::new(id, format!("title {}", id))
            .with_embedding(embedding)
            .with_published_at(now() - Duration::hours(hours_ago))
    }

    fn builder(points: Vec<Datapoint>) -> (Arc<InMemoryDatapointStore>, ClusterBuilder) {
        let store = Arc::new(InMemoryDatapointStore::pinned_at(now()).with_datapoints(points));
        let builder = ClusterBuilder::new(store.clone(), ClusteringConfig::default()).unwrap();
        (store, builder)
    }

    #[tokio::test]
    async fn cluster_datapoints_writes_back_members_only() {
        let points = vec![
            dp("a", vec![1.0, 0.0, 0.0], 1),
            dp("b", vec![1.0, 0.0, 0.0], 1),
            dp("c", vec![1.0, 0.0, 0.0], 1),
            dp("d", vec![0.0, 1.0, 0.0], 1),
        ];
        let (store, builder) = builder(points.clone());

        let clusters = builder.cluster_datapoints(&points, None).await.unwrap();
        let cluster = ClusterId::from_label(0);
        assert_eq!(clusters[&cluster].len(), 3);
        assert!(clusters[&cluster].iter().all(|m| m.clustered));

        let stored = store.get_by_cluster(&cluster).await.unwrap();
        assert_eq!(stored.len(), 3);
        let noise = store.get(&DatapointId::new("d")).await.unwrap().unwrap();
        assert!(!noise.clustered);
        assert!(noise.cluster_id.is_none());
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let points = vec![
            dp("a", vec![1.0, 0.0], 1),
            dp("b", vec![1.0, 0.0], 1),
        ];
        let (store, builder) = builder(points.clone());

        let first = builder.cluster_datapoints(&points, None).await.unwrap();
        let second = builder.cluster_datapoints(&points, None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            store.get_by_cluster(&ClusterId::from_label(0)).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn cluster_by_ids_returns_only_clusters_with_requested_members() {
        let points = vec![
            dp("req", vec![1.0, 0.0], 1),
            dp("ctx1", vec![1.0, 0.0], 2),
            dp("other1", vec![0.0, 1.0], 2),
            dp("other2", vec![0.0, 1.0], 3),
        ];
        let (store, builder) = builder(points);

        let request = ClusterRequest::default().with_context(None);
        let clusters = builder
            .cluster_by_ids(&[DatapointId::new("req")], &request)
            .await
            .unwrap();

        assert_eq!(clusters.len(), 1);
        let members: BTreeSet<_> = clusters
            .values()
            .next()
            .unwrap()
            .iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(
            members,
            ["req", "ctx1"].iter().map(|s| s.to_string()).collect()
        );

        let untouched = store.get(&DatapointId::new("other1")).await.unwrap().unwrap();
        assert!(!untouched.clustered);
    }

    #[tokio::test]
    async fn cluster_by_ids_without_embeddings_is_empty() {
        let (_, builder) = builder(vec![Datapoint::new("bare", "no vector")]);
        let clusters = builder
            .cluster_by_ids(&[DatapointId::new("bare"), DatapointId::new("ghost")], &ClusterRequest::default())
            .await
            .unwrap();
        assert!(clusters.is_empty());
    }

    #[tokio::test]
    async fn cluster_recent_skips_clustered_unless_forced() {
        let mut done = dp("done", vec![1.0, 0.0], 1);
        done.clustered = true;
        done.cluster_id = Some(ClusterId::new("cluster_old"));
        let points = vec![done, dp("fresh", vec![1.0, 0.0], 1)];
        let (_, builder) = builder(points);

        let skipped = builder.cluster_recent(24, &ClusterRequest::default()).await.unwrap();
        assert!(skipped.is_empty());

        let forced = builder
            .cluster_recent(24, &ClusterRequest::default().forced())
            .await
            .unwrap();
        assert_eq!(forced.values().map(Vec::len).sum::<usize>(), 2);
    }

    #[tokio::test]
    async fn unbounded_hours_reach_old_datapoints() {
        let points = vec![
            dp("a", vec![1.0, 0.0], 50_000),
            dp("b", vec![1.0, 0.0], 90_000),
        ];
        let (_, builder) = builder(points);

        let request = ClusterRequest::default().with_context(Some(u32::MAX));
        let by_ids = builder
            .cluster_by_ids(&[DatapointId::new("a")], &request)
            .await
            .unwrap();
        assert_eq!(by_ids[&ClusterId::from_label(0)].len(), 2);

        let recent = builder
            .cluster_recent(u32::MAX, &ClusterRequest::default().forced())
            .await
            .unwrap();
        assert_eq!(recent[&ClusterId::from_label(0)].len(), 2);
    }

    #[tokio::test]
    async fn greedy_mode_is_selected_explicitly() {
        let points = vec![
            dp("a", vec![1.0, 0.0], 1),
            dp("b", vec![0.9, 0.1], 1),
        ];
        let (_, builder) = builder(points);
        let request = ClusterRequest::default()
            .with_mode(ClusterMode::Greedy)
            .forced();
        let clusters = builder.cluster_recent(24, &request).await.unwrap();
        assert_eq!(clusters.len(), 1);
    }

    #[tokio::test]
    async fn find_similar_sorts_and_truncates() {
        let points = vec![
            dp("exact", vec![1.0, 0.0], 1),
            dp("close", vec![0.9, 0.2], 2),
            dp("far", vec![0.0, 1.0], 3),
        ];
        let (_, builder) = builder(points);

        let hits = builder.find_similar(&[1.0, 0.0], 24, 5).await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.datapoint.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "close"]);
        assert!(hits[0].similarity >= hits[1].similarity);

        let top = builder.find_similar(&[1.0, 0.0], 24, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].datapoint.id.as_str(), "exact");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let store = Arc::new(InMemoryDatapointStore::new());
        let config = ClusteringConfig {
            eps: 0.0,
            ..Default::default()
        };
        assert!(ClusterBuilder::new(store, config).is_err());
    }
}
