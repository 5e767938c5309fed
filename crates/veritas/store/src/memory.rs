//! In-memory reference implementation of `DatapointStore`.
//!
//! This adapter is deterministic and test-friendly. Production deployments
//! back the trait with a document database.

use crate::traits::{DatapointStore, RecentQuery};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::RwLock;
use veritas_types::{hours_before, ClusterId, Datapoint, DatapointId};

/// In-memory datapoint store.
#[derive(Default)]
pub struct InMemoryDatapointStore {
    datapoints: RwLock<BTreeMap<DatapointId, Datapoint>>,
    pinned_now: Option<DateTime<Utc>>,
}

impl InMemoryDatapointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose recent-window reads are measured from a fixed instant.
    pub fn pinned_at(now: DateTime<Utc>) -> Self {
        Self {
            datapoints: RwLock::default(),
            pinned_now: Some(now),
        }
    }

    /// Store pre-populated with `datapoints`.
    pub fn with_datapoints(self, datapoints: impl IntoIterator<Item = Datapoint>) -> Self {
        if let Ok(mut guard) = self.datapoints.write() {
            for datapoint in datapoints {
                guard.insert(datapoint.id.clone(), datapoint);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.datapoints.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl DatapointStore for InMemoryDatapointStore {
    async fn get_by_cluster(&self, cluster_id: &ClusterId) -> StoreResult<Vec<Datapoint>> {
        let guard = self
            .datapoints
            .read()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|dp| dp.cluster_id.as_ref() == Some(cluster_id))
            .cloned()
            .collect())
    }

    async fn get_recent(&self, query: RecentQuery) -> StoreResult<Vec<Datapoint>> {
        let since = hours_before(self.now(), query.hours);
        let guard = self
            .datapoints
            .read()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;

        let mut values = guard
            .values()
            .filter(|dp| match &query.source_type {
                Some(source_type) => &dp.source_type == source_type,
                None => true,
            })
            .filter_map(|dp| {
                dp.published()
                    .filter(|ts| *ts >= since)
                    .map(|ts| (ts, dp.clone()))
            })
            .collect::<Vec<_>>();
        values.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        let iter = values.into_iter().map(|(_, dp)| dp);
        Ok(match query.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        })
    }

    async fn get(&self, id: &DatapointId) -> StoreResult<Option<Datapoint>> {
        let guard = self
            .datapoints
            .read()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn find_existing(
        &self,
        id: Option<&DatapointId>,
        url: Option<&str>,
    ) -> StoreResult<Option<Datapoint>> {
        let guard = self
            .datapoints
            .read()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;

        if let Some(found) = id.and_then(|id| guard.get(id)) {
            return Ok(Some(found.clone()));
        }
        Ok(url
            .filter(|url| !url.is_empty())
            .and_then(|url| guard.values().find(|dp| dp.url == url))
            .cloned())
    }

    async fn upsert(&self, datapoint: Datapoint) -> StoreResult<()> {
        let mut guard = self
            .datapoints
            .write()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;
        tracing::debug!(datapoint_id = %datapoint.id, "upserting datapoint");
        guard.insert(datapoint.id.clone(), datapoint);
        Ok(())
    }

    async fn set_cluster(&self, id: &DatapointId, cluster_id: &ClusterId) -> StoreResult<()> {
        let mut guard = self
            .datapoints
            .write()
            .map_err(|_| StoreError::Backend("datapoint lock poisoned".to_string()))?;
        let record = guard
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("datapoint {} not found", id)))?;
        record.cluster_id = Some(cluster_id.clone());
        record.clustered = true;
        Ok(())
    }
}
