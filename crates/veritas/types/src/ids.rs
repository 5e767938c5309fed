use serde::{Deserialize, Serialize};

/// Store-assigned datapoint identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatapointId(pub String);

impl DatapointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatapointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DatapointId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DatapointId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a topic cluster.
///
/// Clusters are recomputed on every run; the identifier only lives on as the
/// `cluster_id` field of each member datapoint.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for the `label`-th cluster of a clustering run.
    pub fn from_label(label: usize) -> Self {
        Self(format!("cluster_{}", label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
