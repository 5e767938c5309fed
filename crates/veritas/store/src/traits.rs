use crate::{ProviderResult, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use veritas_types::{ClusterId, Datapoint, DatapointId};

/// Time-window read over recently published datapoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentQuery {
    /// Look back this many hours from the store's notion of now.
    pub hours: u32,
    /// Restrict to one feed family.
    pub source_type: Option<String>,
    /// Cap on returned records (newest first).
    pub limit: Option<usize>,
}

impl RecentQuery {
    pub fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }
}

/// Persistent datapoint store.
#[async_trait]
pub trait DatapointStore: Send + Sync {
    /// All datapoints currently assigned to `cluster_id`.
    async fn get_by_cluster(&self, cluster_id: &ClusterId) -> StoreResult<Vec<Datapoint>>;

    /// Datapoints published within the query window, newest first.
    async fn get_recent(&self, query: RecentQuery) -> StoreResult<Vec<Datapoint>>;

    /// One datapoint by id.
    async fn get(&self, id: &DatapointId) -> StoreResult<Option<Datapoint>>;

    /// Existing record matching the id, or failing that the url.
    async fn find_existing(
        &self,
        id: Option<&DatapointId>,
        url: Option<&str>,
    ) -> StoreResult<Option<Datapoint>>;

    /// Insert or replace a datapoint keyed by id.
    async fn upsert(&self, datapoint: Datapoint) -> StoreResult<()>;

    /// Record a cluster assignment and mark the datapoint clustered.
    async fn set_cluster(&self, id: &DatapointId, cluster_id: &ClusterId) -> StoreResult<()>;
}

/// Text embedding provider.
///
/// Truncating text to the provider's input limit is the caller's job.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text into a `dimension()`-length vector.
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;

    /// Embed many texts. Providers with a native batch endpoint should override.
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Fixed output dimension.
    fn dimension(&self) -> usize;
}
