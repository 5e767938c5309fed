use crate::ClusterMap;
use serde::{Deserialize, Serialize};

/// Cluster counts by size bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    /// Fewer than 5 members.
    pub small: usize,
    /// 5 to 19 members.
    pub medium: usize,
    /// 20 or more members.
    pub large: usize,
}

/// Summary of a clustering outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatistics {
    pub total_clusters: usize,
    pub total_datapoints: usize,
    pub avg_cluster_size: f64,
    pub largest_cluster_size: usize,
    pub smallest_cluster_size: usize,
    pub size_distribution: SizeDistribution,
}

impl ClusterStatistics {
    pub fn from_clusters(clusters: &ClusterMap) -> Self {
        if clusters.is_empty() {
            return Self::default();
        }

        let sizes: Vec<usize> = clusters.values().map(Vec::len).collect();
        let total: usize = sizes.iter().sum();

        let mut distribution = SizeDistribution::default();
        for &size in &sizes {
            match size {
                0..=4 => distribution.small += 1,
                5..=19 => distribution.medium += 1,
                _ => distribution.large += 1,
            }
        }

        Self {
            total_clusters: sizes.len(),
            total_datapoints: total,
            avg_cluster_size: total as f64 / sizes.len() as f64,
            largest_cluster_size: sizes.iter().copied().max().unwrap_or(0),
            smallest_cluster_size: sizes.iter().copied().min().unwrap_or(0),
            size_distribution: distribution,
        }
    }
}
