//! # veritas-signals
//!
//! The four Signal Analyzers. Each is a pure function of a cluster's members
//! and its injected configuration:
//!
//! | Analyzer | Configuration | Signal |
//! |---|---|---|
//! | [`GrowthAnalyzer`] | [`GrowthPolicy`] | [`GrowthSignal`] |
//! | [`CredibilityAnalyzer`] | [`SourceCredibility`] | [`CredibilitySignal`] |
//! | [`ContradictionAnalyzer`] | [`ContradictionLexicon`] | [`ContradictionSignal`] |
//! | [`EvolutionAnalyzer`] | [`EvolutionPolicy`] | [`EvolutionSignal`] |
//!
//! Analyzers hold no mutable state and may run concurrently. Too little data
//! is not an error: the signal comes back with zero risk (or, for credibility,
//! maximal risk) and an [`InsufficientData`](veritas_types::InsufficientData)
//! reason. Only malformed input is rejected.
//!
//! The numeric thresholds throughout are product-tuned calibration policy.
//! They are exposed as configuration so they can be re-tuned, not corrected.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod analyzer;
pub mod contradiction;
pub mod credibility;
pub mod evolution;
pub mod growth;
pub mod serde_rate;
pub mod text;
mod timeline;

pub use analyzer::{RiskSignal, SignalAnalyzer};
pub use contradiction::{
    ClaimRef, ContradictionAnalyzer, ContradictionKind, ContradictionLexicon, ContradictionPair,
    ContradictionSignal, DetectionRoute,
};
pub use credibility::{CredibilityAnalyzer, CredibilitySignal, SourceCredibility, SourceScore};
pub use evolution::{EvolutionAnalyzer, EvolutionPolicy, EvolutionSignal, EvolutionStage, NarrativeChange};
pub use growth::{GrowthAnalyzer, GrowthPolicy, GrowthSignal};
