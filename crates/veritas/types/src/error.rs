use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ClusterId, DatapointId};

/// Result type for operations that validate their input.
pub type InputResult<T> = Result<T, InputError>;

/// Malformed input. Rejected immediately and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("embedding dimension mismatch for datapoint {datapoint_id}: expected {expected}, found {found}")]
    DimensionMismatch {
        datapoint_id: DatapointId,
        expected: usize,
        found: usize,
    },

    #[error("cluster {0} has no member datapoints")]
    EmptyCluster(ClusterId),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Why an analyzer returned a zero-risk result instead of a measurement.
///
/// Not an error: the signal is simply absent for lack of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientData {
    NoDatapoints,
    TooFewDatapoints,
    TooFewTimestamps,
}

impl InsufficientData {
    pub fn reason(&self) -> &'static str {
        match self {
            InsufficientData::NoDatapoints => "no_datapoints",
            InsufficientData::TooFewDatapoints => "too_few_datapoints",
            InsufficientData::TooFewTimestamps => "too_few_timestamps",
        }
    }
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}
