use thiserror::Error;
use veritas_store::StoreError;
use veritas_types::InputError;

/// Errors from risk assessment and pipeline setup.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("datapoint store error: {0}")]
    Store(#[from] StoreError),

    /// An analyzer task panicked or was cancelled on the blocking pool.
    #[error("analyzer task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("tracing setup failed: {0}")]
    Telemetry(String),
}

/// Convenience type alias for risk results.
pub type RiskResult<T> = Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_types::ClusterId;

    #[test]
    fn empty_cluster_displays_its_id() {
        let e: RiskError = InputError::EmptyCluster(ClusterId::new("cluster_7")).into();
        assert!(matches!(e, RiskError::Input(InputError::EmptyCluster(_))));
        assert!(e.to_string().contains("cluster_7"));
    }

    #[test]
    fn config_errors_convert() {
        let e: RiskError = config::ConfigError::Message("bad weight".into()).into();
        assert!(e.to_string().starts_with("configuration error"));
    }
}
