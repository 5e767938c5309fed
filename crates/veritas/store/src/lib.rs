//! Veritas collaborator boundary.
//!
//! This crate defines the contracts through which the analysis core reaches
//! the outside world:
//! - `DatapointStore`: the persistent datapoint store (reads + cluster write-back)
//! - `EmbeddingProvider`: text to fixed-length vector
//!
//! Design stance:
//! - The core never retries. Timeouts and retry policy belong to the adapter.
//! - `set_cluster` is an idempotent upsert keyed by datapoint id, so concurrent
//!   clustering runs may interleave without corrupting records.
//! - `InMemoryDatapointStore` is the deterministic reference adapter used in tests.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod traits;

pub use error::{ProviderError, ProviderResult, StoreError, StoreResult};
pub use memory::InMemoryDatapointStore;
pub use traits::{DatapointStore, EmbeddingProvider, RecentQuery};
