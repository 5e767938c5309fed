use thiserror::Error;
use veritas_store::{ProviderError, StoreError};
use veritas_types::InputError;

/// Errors from clustering operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("datapoint store error: {0}")]
    Store(#[from] StoreError),

    #[error("embedding provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Convenience type alias for clustering results.
pub type ClusterResult<T> = Result<T, ClusterError>;
