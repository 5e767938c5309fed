use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for embedding provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Datapoint store errors, propagated unchanged by the core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Embedding provider errors, propagated unchanged by the core.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert!(StoreError::NotFound("dp-1".into()).to_string().contains("dp-1"));
        assert!(StoreError::Backend("lock poisoned".into())
            .to_string()
            .contains("lock poisoned"));
        assert!(ProviderError::Unavailable("rate limited".into())
            .to_string()
            .contains("rate limited"));
    }
}
