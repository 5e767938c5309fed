//! Narrative evolution signal.
//!
//! Members are grouped into consecutive time windows in a single pass: the
//! first unassigned point opens a window, later points join while they fall
//! within `window_hours` of its start. Each window's top keywords are compared
//! with the previous window's; new keywords mark a narrative change.

use crate::analyzer::{ramp, unit, RiskSignal, SignalAnalyzer};
use crate::text::{top_keywords, truncate_chars};
use crate::timeline::chronological;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use veritas_types::{hours_span, Datapoint, InputResult, InsufficientData};

const MAX_NEW_KEYWORDS: usize = 5;
const NOTE_KEYWORDS: usize = 3;
const SAMPLE_TITLES: usize = 3;
const SAMPLE_TITLE_CHARS: usize = 80;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
];

/// Narrative evolution calibration policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionPolicy {
    pub window_hours: u32,
    /// Keywords kept per window.
    pub top_n: usize,
    /// Minimum members (and parsable timestamps) to measure anything.
    pub min_datapoints: usize,
    pub stopwords: BTreeSet<String>,
    /// Change frequency above which risk ramps toward `high_weight`.
    pub frequency_floor: f64,
    pub high_weight: f64,
    /// Risk per unit frequency at or below the floor.
    pub low_weight: f64,
}

impl Default for EvolutionPolicy {
    fn default() -> Self {
        Self {
            window_hours: 6,
            top_n: 5,
            min_datapoints: 3,
            stopwords: STOPWORDS.iter().map(|w| w.to_string()).collect(),
            frequency_floor: 0.5,
            high_weight: 0.6,
            low_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub window_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub datapoint_count: usize,
    pub key_phrases: Vec<String>,
    pub sample_titles: Vec<String>,
}

/// Keywords that appeared in a window but not in the one before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeChange {
    pub window: usize,
    pub new_keywords: Vec<String>,
    pub description: String,
}

/// Evolution analysis of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSignal {
    pub has_evolution: bool,
    pub evolution_stages: Vec<EvolutionStage>,
    pub key_changes: Vec<NarrativeChange>,
    pub total_stages: usize,
    pub change_count: usize,
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient: Option<InsufficientData>,
}

impl EvolutionSignal {
    fn without_measurement(reason: InsufficientData) -> Self {
        Self {
            has_evolution: false,
            evolution_stages: Vec::new(),
            key_changes: Vec::new(),
            total_stages: 0,
            change_count: 0,
            risk_score: 0.0,
            insufficient: Some(reason),
        }
    }
}

impl RiskSignal for EvolutionSignal {
    fn risk_score(&self) -> f64 {
        self.risk_score
    }

    fn indicator(&self) -> bool {
        self.has_evolution
    }

    fn insufficient(&self) -> Option<InsufficientData> {
        self.insufficient
    }
}

/// Tracks how a cluster's vocabulary drifts over time.
#[derive(Debug, Clone, Default)]
pub struct EvolutionAnalyzer {
    policy: EvolutionPolicy,
}

impl EvolutionAnalyzer {
    pub fn new(policy: EvolutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EvolutionPolicy {
        &self.policy
    }

    fn risk(&self, change_count: usize, window_count: usize) -> f64 {
        if change_count == 0 {
            return 0.0;
        }
        let p = &self.policy;
        let frequency = change_count as f64 / window_count.max(1) as f64;
        if frequency > p.frequency_floor {
            ramp(frequency, p.frequency_floor, 1.0 - p.frequency_floor) * p.high_weight
        } else {
            unit(frequency * p.low_weight)
        }
    }
}

/// Split a chronological sequence into consecutive windows anchored at each
/// window's first timestamp.
fn windows<'a>(
    timed: &[(DateTime<Utc>, &'a Datapoint)],
    width: Duration,
) -> Vec<Vec<(DateTime<Utc>, &'a Datapoint)>> {
    let mut out: Vec<Vec<(DateTime<Utc>, &'a Datapoint)>> = Vec::new();
    let mut start: Option<DateTime<Utc>> = None;
    for &(ts, dp) in timed {
        if let (Some(s), Some(current)) = (start, out.last_mut()) {
            if ts - s <= width {
                current.push((ts, dp));
                continue;
            }
        }
        start = Some(ts);
        out.push(vec![(ts, dp)]);
    }
    out
}

impl SignalAnalyzer for EvolutionAnalyzer {
    type Signal = EvolutionSignal;

    fn analyze(&self, datapoints: &[Datapoint]) -> InputResult<EvolutionSignal> {
        let p = &self.policy;
        if datapoints.len() < p.min_datapoints {
            return Ok(EvolutionSignal::without_measurement(
                InsufficientData::TooFewDatapoints,
            ));
        }

        let timed = chronological(datapoints);
        if timed.len() < p.min_datapoints {
            return Ok(EvolutionSignal::without_measurement(
                InsufficientData::TooFewTimestamps,
            ));
        }

        let grouped = windows(&timed, hours_span(p.window_hours));

        let mut stages = Vec::with_capacity(grouped.len());
        let mut changes = Vec::new();
        let mut previous: Option<Vec<String>> = None;

        for (index, window) in grouped.iter().enumerate() {
            let (Some(&(start, _)), Some(&(end, _))) = (window.first(), window.last()) else {
                continue;
            };
            let keywords = top_keywords(
                window.iter().map(|(_, dp)| dp.title.as_str()),
                &p.stopwords,
                p.top_n,
            );

            if let Some(before) = &previous {
                let new_keywords: Vec<String> = keywords
                    .iter()
                    .filter(|k| !before.contains(k))
                    .take(MAX_NEW_KEYWORDS)
                    .cloned()
                    .collect();
                if !new_keywords.is_empty() {
                    let named: Vec<&str> = new_keywords
                        .iter()
                        .take(NOTE_KEYWORDS)
                        .map(String::as_str)
                        .collect();
                    changes.push(NarrativeChange {
                        window: index,
                        description: format!("narrative shift: new focus on {}", named.join(", ")),
                        new_keywords,
                    });
                }
            }

            stages.push(EvolutionStage {
                window_index: index,
                start,
                end,
                datapoint_count: window.len(),
                key_phrases: keywords.clone(),
                sample_titles: window
                    .iter()
                    .take(SAMPLE_TITLES)
                    .map(|(_, dp)| truncate_chars(&dp.title, SAMPLE_TITLE_CHARS).to_string())
                    .collect(),
            });
            previous = Some(keywords);
        }

        let change_count = changes.len();
        Ok(EvolutionSignal {
            has_evolution: change_count > 0,
            total_stages: stages.len(),
            risk_score: self.risk(change_count, grouped.len()),
            evolution_stages: stages,
            key_changes: changes,
            change_count,
            insufficient: None,
        })
    }

    fn name(&self) -> &'static str {
        "evolution"
    }
}
