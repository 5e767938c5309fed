//! # veritas-risk
//!
//! Risk Aggregator: combines the four cluster signals into one assessment
//! and runs it over every recent cluster.
//!
//! ## Pipeline
//!
//! ```text
//!   store.get_by_cluster(id)
//!            │
//!            ▼
//!   ┌──────────────── RiskEngine ────────────────┐
//!   │  growth   credibility  contradiction  evo  │  (blocking pool, joined)
//!   └──────────────────────┬─────────────────────┘
//!                          ▼
//!   weighted sum ─► level ─► flags ─► recommendation ─► ClusterAnalysis
//! ```
//!
//! [`RiskAggregator::analyze_all`] fans this out across clusters with a
//! bounded number in flight and records per-cluster failures in the
//! [`BatchReport`] instead of aborting.
//!
//! [`VeritasConfig`] loads every calibration table and threshold from
//! defaults, a file and the environment, and wires the pipeline.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod aggregator;
pub mod analysis;
pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod telemetry;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use aggregator::{RiskAggregator, DEFAULT_MAX_CONCURRENT_CLUSTERS};
pub use analysis::ClusterAnalysis;
pub use batch::{BatchEntry, BatchReport};
pub use config::{BatchConfig, LoggingConfig, VeritasConfig};
pub use engine::RiskEngine;
pub use error::{RiskError, RiskResult};
pub use policy::{Recommendation, RiskFlags, RiskLevel, RiskPolicy, SignalWeights};
pub use telemetry::init_tracing;
