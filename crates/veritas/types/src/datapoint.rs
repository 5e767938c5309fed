use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ClusterId, DatapointId};
use crate::timestamp::PublishedAt;

/// Source name used when a feed does not report one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One short-form document owned by the datapoint store.
///
/// Analysis treats a datapoint as an immutable value. The only field the core
/// ever asks the store to change is the cluster assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub id: DatapointId,
    /// Feed family, e.g. `rss` or `search`.
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// `None` when the feed had no timestamp at all.
    #[serde(default)]
    pub published_at: Option<PublishedAt>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// `None` until the embedding provider has vectorized the record.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub cluster_id: Option<ClusterId>,
    #[serde(default)]
    pub clustered: bool,
}

impl Datapoint {
    /// Minimal record with the given id and title; everything else absent.
    pub fn new(id: impl Into<DatapointId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_type: String::new(),
            source_name: String::new(),
            url: String::new(),
            title: title.into(),
            content: String::new(),
            published_at: None,
            author: None,
            categories: Vec::new(),
            embedding: None,
            cluster_id: None,
            clustered: false,
        }
    }

    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<PublishedAt>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Embedding usable for similarity work: present and non-empty.
    pub fn valid_embedding(&self) -> Option<&[f32]> {
        match &self.embedding {
            Some(vector) if !vector.is_empty() => Some(vector.as_slice()),
            _ => None,
        }
    }

    /// Parsed publication time, if any.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_ref().and_then(PublishedAt::resolve)
    }

    /// Source name with the feed default applied.
    pub fn source(&self) -> &str {
        let trimmed = self.source_name.trim();
        if trimmed.is_empty() {
            UNKNOWN_SOURCE
        } else {
            trimmed
        }
    }
}
