//! Temporal growth signal.
//!
//! Compares the number of datapoints in the latest window against the window
//! immediately before it. Legitimate breaking news also grows fast, so the
//! rapid-growth bar is high and the risk contribution is capped low.

use crate::analyzer::{ramp, unit, RiskSignal, SignalAnalyzer};
use crate::timeline::{chronological, hours_between};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veritas_types::{hours_before, Datapoint, InputResult, InsufficientData};

/// Growth calibration policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPolicy {
    /// Width of the current and previous windows.
    pub window_hours: u32,
    /// `growth_rate` at or above this is rapid (with enough points).
    pub rapid_multiplier: f64,
    /// Minimum current-window size for rapid growth.
    pub rapid_min_current: usize,
    /// Growth-rate term: starts above `growth_floor`, saturates `growth_span` later.
    pub growth_floor: f64,
    pub growth_span: f64,
    pub growth_weight: f64,
    /// Velocity term over datapoints per hour.
    pub velocity_floor: f64,
    pub velocity_span: f64,
    pub velocity_weight: f64,
    /// Ceiling on the total growth risk.
    pub risk_cap: f64,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            window_hours: 6,
            rapid_multiplier: 10.0,
            rapid_min_current: 10,
            growth_floor: 15.0,
            growth_span: 20.0,
            growth_weight: 0.1,
            velocity_floor: 20.0,
            velocity_span: 30.0,
            velocity_weight: 0.05,
            risk_cap: 0.2,
        }
    }
}

/// Growth analysis of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSignal {
    pub is_rapid_growth: bool,
    /// `current / previous`; infinite when only the current window is populated.
    #[serde(with = "crate::serde_rate")]
    pub growth_rate: f64,
    pub current_size: usize,
    pub previous_size: usize,
    pub time_window_hours: u32,
    pub datapoints_per_hour: f64,
    pub total_datapoints: usize,
    pub first_datapoint_time: Option<DateTime<Utc>>,
    pub last_datapoint_time: Option<DateTime<Utc>>,
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient: Option<InsufficientData>,
}

impl GrowthSignal {
    fn without_measurement(total: usize, window_hours: u32, reason: InsufficientData) -> Self {
        Self {
            is_rapid_growth: false,
            growth_rate: 0.0,
            current_size: total,
            previous_size: 0,
            time_window_hours: window_hours,
            datapoints_per_hour: 0.0,
            total_datapoints: total,
            first_datapoint_time: None,
            last_datapoint_time: None,
            risk_score: 0.0,
            insufficient: Some(reason),
        }
    }
}

impl RiskSignal for GrowthSignal {
    fn risk_score(&self) -> f64 {
        self.risk_score
    }

    fn indicator(&self) -> bool {
        self.is_rapid_growth
    }

    fn insufficient(&self) -> Option<InsufficientData> {
        self.insufficient
    }
}

/// Detects sudden cluster growth.
#[derive(Debug, Clone, Default)]
pub struct GrowthAnalyzer {
    policy: GrowthPolicy,
}

impl GrowthAnalyzer {
    pub fn new(policy: GrowthPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    fn risk(&self, growth_rate: f64, per_hour: f64) -> f64 {
        let p = &self.policy;
        let growth = if growth_rate > p.growth_floor {
            ramp(growth_rate, p.growth_floor, p.growth_span) * p.growth_weight
        } else {
            0.0
        };
        let velocity = if per_hour > p.velocity_floor {
            ramp(per_hour, p.velocity_floor, p.velocity_span) * p.velocity_weight
        } else {
            0.0
        };
        unit((growth + velocity).min(p.risk_cap))
    }
}

impl SignalAnalyzer for GrowthAnalyzer {
    type Signal = GrowthSignal;

    fn analyze(&self, datapoints: &[Datapoint]) -> InputResult<GrowthSignal> {
        let total = datapoints.len();
        let window_hours = self.policy.window_hours;
        if total < 2 {
            return Ok(GrowthSignal::without_measurement(
                total,
                window_hours,
                InsufficientData::TooFewDatapoints,
            ));
        }

        let timed = chronological(datapoints);
        let (Some(&(first, _)), Some(&(latest, _))) = (timed.first(), timed.last()) else {
            return Ok(GrowthSignal::without_measurement(
                total,
                window_hours,
                InsufficientData::TooFewTimestamps,
            ));
        };
        if timed.len() < 2 {
            return Ok(GrowthSignal::without_measurement(
                total,
                window_hours,
                InsufficientData::TooFewTimestamps,
            ));
        }

        let current_start = hours_before(latest, window_hours);
        let previous_start = hours_before(current_start, window_hours);

        let current_size = timed.iter().filter(|(ts, _)| *ts >= current_start).count();
        let previous_size = timed
            .iter()
            .filter(|(ts, _)| *ts >= previous_start && *ts < current_start)
            .count();

        let growth_rate = match (previous_size, current_size) {
            (0, 0) => 0.0,
            (0, _) => f64::INFINITY,
            (prev, cur) => cur as f64 / prev as f64,
        };

        let span_hours = hours_between(first, latest).max(1.0);
        let datapoints_per_hour = timed.len() as f64 / span_hours;

        let is_rapid_growth = growth_rate >= self.policy.rapid_multiplier
            && current_size >= self.policy.rapid_min_current;

        Ok(GrowthSignal {
            is_rapid_growth,
            growth_rate,
            current_size,
            previous_size,
            time_window_hours: window_hours,
            datapoints_per_hour,
            total_datapoints: total,
            first_datapoint_time: Some(first),
            last_datapoint_time: Some(latest),
            risk_score: self.risk(growth_rate, datapoints_per_hour),
            insufficient: None,
        })
    }

    fn name(&self) -> &'static str {
        "growth"
    }
}
