//! Clustering parameters.

use serde::{Deserialize, Serialize};
use veritas_types::{InputError, InputResult};

/// Which partitioning algorithm a request runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// DBSCAN over cosine distance.
    #[default]
    Density,
    /// Single-pass seed grouping by similarity threshold.
    Greedy,
}

/// Clustering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Maximum cosine distance between neighbours.
    pub eps: f64,
    /// Neighbourhood size (self included) that makes a point core.
    pub min_points: usize,
    /// Minimum similarity for `find_similar` hits.
    pub similarity_threshold: f64,
    /// Minimum similarity for a point to join a greedy seed.
    pub greedy_threshold: f64,
    /// Smallest group the greedy mode keeps.
    pub greedy_min_cluster_size: usize,
    /// Look-back window for context augmentation.
    pub context_hours: u32,
    /// Mode used when a request does not name one.
    pub default_mode: ClusterMode,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps: 0.30,
            min_points: 2,
            similarity_threshold: 0.75,
            greedy_threshold: 0.75,
            greedy_min_cluster_size: 2,
            context_hours: 168,
            default_mode: ClusterMode::Density,
        }
    }
}

impl ClusteringConfig {
    /// Reject parameters the algorithms cannot honour.
    pub fn validate(&self) -> InputResult<()> {
        validate_eps(self.eps)?;
        validate_min_points("min_points", self.min_points)?;
        validate_threshold("similarity_threshold", self.similarity_threshold)?;
        validate_threshold("greedy_threshold", self.greedy_threshold)?;
        validate_min_points("greedy_min_cluster_size", self.greedy_min_cluster_size)?;
        Ok(())
    }
}

pub(crate) fn validate_eps(eps: f64) -> InputResult<()> {
    if eps.is_finite() && eps > 0.0 && eps <= 2.0 {
        Ok(())
    } else {
        Err(InputError::InvalidParameter {
            name: "eps",
            reason: format!("must be in (0, 2], got {}", eps),
        })
    }
}

pub(crate) fn validate_min_points(name: &'static str, value: usize) -> InputResult<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(InputError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        })
    }
}

pub(crate) fn validate_threshold(name: &'static str, value: f64) -> InputResult<()> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InputError::InvalidParameter {
            name,
            reason: format!("must be in [-1, 1], got {}", value),
        })
    }
}
