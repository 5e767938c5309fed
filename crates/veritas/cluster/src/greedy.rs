//! Greedy threshold grouping.
//!
//! Each unconsumed point in input order seeds a group and absorbs every later
//! unconsumed point whose similarity to the seed reaches the threshold. Seed
//! and absorbed points are consumed even when the group is too small to keep.
//! The result depends on input order.

use crate::config::{validate_min_points, validate_threshold};
use crate::similarity::{cosine_similarity, valid_embeddings};
use crate::ClusterMap;
use tracing::debug;
use veritas_types::{ClusterId, Datapoint, InputResult};

/// Greedy grouping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyParams {
    pub similarity_threshold: f64,
    pub min_cluster_size: usize,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            min_cluster_size: 2,
        }
    }
}

/// Partition `datapoints` by seed similarity. Groups below the minimum size are dropped.
pub fn partition_greedy(datapoints: &[Datapoint], params: GreedyParams) -> InputResult<ClusterMap> {
    validate_threshold("similarity_threshold", params.similarity_threshold)?;
    validate_min_points("min_cluster_size", params.min_cluster_size)?;

    let points = valid_embeddings(datapoints)?;
    if points.len() < 2 {
        return Ok(ClusterMap::new());
    }

    let mut consumed = vec![false; points.len()];
    let mut clusters = ClusterMap::new();
    let mut next_label = 0usize;
    let mut discarded = 0usize;

    for seed in 0..points.len() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        let seed_embedding = points[seed].valid_embedding().unwrap_or(&[]);

        let mut group = vec![seed];
        for candidate in (seed + 1)..points.len() {
            if consumed[candidate] {
                continue;
            }
            let embedding = points[candidate].valid_embedding().unwrap_or(&[]);
            if cosine_similarity(seed_embedding, embedding) >= params.similarity_threshold {
                consumed[candidate] = true;
                group.push(candidate);
            }
        }

        if group.len() >= params.min_cluster_size {
            clusters.insert(
                ClusterId::from_label(next_label),
                group.into_iter().map(|i| points[i].clone()).collect(),
            );
            next_label += 1;
        } else {
            discarded += group.len();
        }
    }

    debug!(
        points = points.len(),
        clusters = clusters.len(),
        discarded,
        "greedy partition complete"
    );
    Ok(clusters)
}
