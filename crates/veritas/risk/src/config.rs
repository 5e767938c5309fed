//! Runtime configuration for the Veritas pipeline.
//!
//! Values are layered: built-in defaults, then an optional file (any format
//! the `config` crate recognises by extension), then `VERITAS__` environment
//! variables with `__` between path segments, e.g.
//! `VERITAS__RISK__HIGH_THRESHOLD=0.55`.

use crate::aggregator::{RiskAggregator, DEFAULT_MAX_CONCURRENT_CLUSTERS};
use crate::engine::RiskEngine;
use crate::error::RiskResult;
use crate::policy::RiskPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use veritas_cluster::{ClusterBuilder, ClusterResult, ClusteringConfig};
use veritas_signals::{
    ContradictionAnalyzer, ContradictionLexicon, CredibilityAnalyzer, EvolutionAnalyzer,
    EvolutionPolicy, GrowthAnalyzer, GrowthPolicy, SourceCredibility,
};
use veritas_store::DatapointStore;
use veritas_types::InputResult;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VERITAS";

/// Separator between prefix and nested keys in environment variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeritasConfig {
    pub clustering: ClusteringConfig,
    pub growth: GrowthPolicy,
    pub credibility: SourceCredibility,
    pub contradiction: ContradictionLexicon,
    pub evolution: EvolutionPolicy,
    pub risk: RiskPolicy,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

/// Defaults for batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Look-back window for finding clusters.
    pub hours: u32,
    pub min_cluster_size: usize,
    pub max_concurrent_clusters: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            hours: 168,
            min_cluster_size: 2,
            max_concurrent_clusters: DEFAULT_MAX_CONCURRENT_CLUSTERS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level directive, used when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl VeritasConfig {
    /// Load configuration from defaults, `path` (if given) and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> RiskResult<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// The environment source `load` reads.
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    /// Like [`load`](Self::load) with a caller-supplied environment source.
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> RiskResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let loaded: Self = builder.add_source(env).build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> InputResult<()> {
        self.clustering.validate()?;
        self.risk.validate()
    }

    pub fn build_engine(&self) -> InputResult<RiskEngine> {
        RiskEngine::new(
            GrowthAnalyzer::new(self.growth.clone()),
            CredibilityAnalyzer::new(self.credibility.clone()),
            ContradictionAnalyzer::new(self.contradiction.clone()),
            EvolutionAnalyzer::new(self.evolution.clone()),
            self.risk.clone(),
        )
    }

    /// Aggregator over `store` with every analyzer configured from `self`.
    pub fn build_aggregator(&self, store: Arc<dyn DatapointStore>) -> RiskResult<RiskAggregator> {
        Ok(RiskAggregator::new(store, self.build_engine()?)
            .with_max_concurrent_clusters(self.batch.max_concurrent_clusters))
    }

    pub fn build_cluster_builder(
        &self,
        store: Arc<dyn DatapointStore>,
    ) -> ClusterResult<ClusterBuilder> {
        ClusterBuilder::new(store, self.clustering.clone())
    }
}
