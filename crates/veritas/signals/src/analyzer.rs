use serde::Serialize;
use veritas_types::{Datapoint, InputResult, InsufficientData};

// ── Trait ────────────────────────────────────────────────────────────────

/// A pluggable cluster signal.
///
/// Implementations are pure: the same members and configuration always
/// produce the same signal.
pub trait SignalAnalyzer: Send + Sync {
    type Signal: RiskSignal + Serialize + Clone + Send + 'static;

    /// Analyze one cluster's members.
    fn analyze(&self, datapoints: &[Datapoint]) -> InputResult<Self::Signal>;

    /// Name of the signal (for logs and provenance).
    fn name(&self) -> &'static str;
}

/// Common view over every signal result.
pub trait RiskSignal {
    /// Contribution in `[0, 1]`.
    fn risk_score(&self) -> f64;

    /// The analyzer's own boolean indicator.
    fn indicator(&self) -> bool;

    /// Set when the analyzer had too little data to measure anything.
    fn insufficient(&self) -> Option<InsufficientData>;
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear ramp: 0 at `floor`, 1 at `floor + span`, clamped.
pub(crate) fn ramp(value: f64, floor: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return if value > floor { 1.0 } else { 0.0 };
    }
    unit((value - floor) / span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_clamps_and_absorbs_nan() {
        assert_eq!(unit(-0.5), 0.0);
        assert_eq!(unit(1.5), 1.0);
        assert_eq!(unit(f64::NAN), 0.0);
        assert_eq!(unit(0.25), 0.25);
    }

    #[test]
    fn ramp_is_linear_between_floor_and_ceiling() {
        assert_eq!(ramp(15.0, 15.0, 20.0), 0.0);
        assert_eq!(ramp(25.0, 15.0, 20.0), 0.5);
        assert_eq!(ramp(f64::INFINITY, 15.0, 20.0), 1.0);
    }
}
