//! # veritas-cluster
//!
//! Cluster Builder: groups datapoints into topic clusters by embedding similarity.
//!
//! ## Modes
//!
//! ```text
//!   datapoints
//!       │  drop missing / empty embeddings, reject mixed dimensions
//!       ▼
//!   ┌───────────────────────┐        ┌───────────────────────┐
//!   │  Density (DBSCAN)     │   or   │  Greedy (fallback)    │
//!   │  order-invariant      │        │  seed-order dependent │
//!   └──────────┬────────────┘        └──────────┬────────────┘
//!              └───────────────┬────────────────┘
//!                              ▼
//!              ClusterMap (noise dropped) ──► store.set_cluster(..) per member
//! ```
//!
//! The two modes do not produce equivalent partitions and are never swapped
//! for one another implicitly: callers choose with [`ClusterMode`].
//!
//! ## Invariants
//!
//! - Fewer than two valid embeddings yields an empty map, never an error.
//! - Every returned cluster has at least `min_points` members.
//! - Every datapoint appears in at most one cluster.
//! - Noise points are never written back to the store.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod config;
pub mod dbscan;
pub mod error;
pub mod greedy;
pub mod similarity;
pub mod stats;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use builder::{ClusterBuilder, ClusterRequest, SimilarDatapoint};
pub use config::{ClusterMode, ClusteringConfig};
pub use dbscan::{partition_density, DensityParams};
pub use error::{ClusterError, ClusterResult};
pub use greedy::{partition_greedy, GreedyParams};
pub use similarity::{cosine_distance, cosine_similarity, valid_embeddings};
pub use stats::{ClusterStatistics, SizeDistribution};

use std::collections::BTreeMap;
use veritas_types::{ClusterId, Datapoint};

/// Cluster identifier to member datapoints.
pub type ClusterMap = BTreeMap<ClusterId, Vec<Datapoint>>;
