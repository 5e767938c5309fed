//! Density-based partitioning (DBSCAN over cosine distance).
//!
//! The partition does not depend on input order:
//!
//! 1. Core points are those with at least `min_points` neighbours within
//!    `eps` (the point itself counts).
//! 2. Clusters are connected components of core points.
//! 3. A border point joins its nearest core neighbour, ties broken by the
//!    smallest datapoint id.
//! 4. Everything else is noise and is dropped.
//!
//! Only the numeric labels follow input order: a component is labelled when
//! its first core point is reached in the input.

use crate::config::{validate_eps, validate_min_points};
use crate::similarity::{cosine_distance, valid_embeddings};
use crate::ClusterMap;
use std::cmp::Ordering;
use tracing::debug;
use veritas_types::{ClusterId, Datapoint, InputResult};

/// DBSCAN parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParams {
    pub eps: f64,
    pub min_points: usize,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            eps: 0.30,
            min_points: 2,
        }
    }
}

/// Partition `datapoints` into density clusters. Noise is omitted.
///
/// Returned members are clones of the input records, in input order.
pub fn partition_density(datapoints: &[Datapoint], params: DensityParams) -> InputResult<ClusterMap> {
    validate_eps(params.eps)?;
    validate_min_points("min_points", params.min_points)?;

    let points = valid_embeddings(datapoints)?;
    if points.len() < 2 {
        return Ok(ClusterMap::new());
    }

    let labels = label_points(&points, params);

    let mut clusters = ClusterMap::new();
    for (point, label) in points.iter().zip(labels.iter()) {
        if let Some(label) = label {
            clusters
                .entry(ClusterId::from_label(*label))
                .or_default()
                .push((*point).clone());
        }
    }

    debug!(
        points = points.len(),
        clusters = clusters.len(),
        noise = labels.iter().filter(|l| l.is_none()).count(),
        "density partition complete"
    );
    Ok(clusters)
}

/// Per-point labels; `None` is noise.
fn label_points(points: &[&Datapoint], params: DensityParams) -> Vec<Option<usize>> {
    let n = points.len();
    let embedding = |i: usize| points[i].valid_embedding().unwrap_or(&[]);

    // Pairwise distances are symmetric, so compute each pair once.
    let mut neighbours: Vec<Vec<(usize, f64)>> = (0..n).map(|i| vec![(i, 0.0)]).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = cosine_distance(embedding(i), embedding(j));
            if distance <= params.eps {
                neighbours[i].push((j, distance));
                neighbours[j].push((i, distance));
            }
        }
    }

    let core: Vec<bool> = neighbours
        .iter()
        .map(|list| list.len() >= params.min_points)
        .collect();

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_label = 0usize;

    // ── Core components ─────────────────────────────────────────────────

    for start in 0..n {
        if !core[start] || labels[start].is_some() {
            continue;
        }
        labels[start] = Some(next_label);
        let mut frontier = vec![start];
        while let Some(current) = frontier.pop() {
            for &(other, _) in &neighbours[current] {
                if core[other] && labels[other].is_none() {
                    labels[other] = Some(next_label);
                    frontier.push(other);
                }
            }
        }
        next_label += 1;
    }

    // ── Border points ───────────────────────────────────────────────────

    for i in 0..n {
        if core[i] {
            continue;
        }
        let nearest = neighbours[i]
            .iter()
            .filter(|(other, _)| core[*other])
            .min_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| points[a.0].id.cmp(&points[b.0].id))
            });
        if let Some(&(other, _)) = nearest {
            labels[i] = labels[other];
        }
    }

    labels
}
