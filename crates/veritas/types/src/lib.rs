//! Veritas core records.
//!
//! This crate defines the typed vocabulary shared by every Veritas component:
//! - `Datapoint`: one short-form document with optional embedding and timestamp
//! - `DatapointId` / `ClusterId`: identity newtypes
//! - `PublishedAt`: a timestamp that may arrive native or as unparsed text
//! - `InputError`: malformed-input rejections
//! - `InsufficientData`: the machine-readable reason an analyzer had too little to work with
//! - `cosine_similarity`: the one embedding similarity every consumer shares
//!
//! Absence is modelled explicitly. A datapoint without an embedding or without a
//! parsable timestamp is a valid record; each consumer decides what it can do with it.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod datapoint;
mod error;
mod ids;
mod timestamp;
mod vector;

pub use datapoint::{Datapoint, UNKNOWN_SOURCE};
pub use error::{InputError, InputResult, InsufficientData};
pub use ids::{ClusterId, DatapointId};
pub use timestamp::{hours_before, hours_span, PublishedAt};
pub use vector::cosine_similarity;
