//! Source credibility signal.
//!
//! Each member's source is scored against an injected table. A cluster fed
//! mostly by low-scoring sources is riskier; fact-checker coverage or a
//! credible majority earns a bonus.

use crate::analyzer::{unit, RiskSignal, SignalAnalyzer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use veritas_types::{Datapoint, InputResult, InsufficientData, UNKNOWN_SOURCE};

/// One row of the credibility table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceScore {
    pub name: String,
    pub score: f64,
}

impl SourceScore {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Immutable source-credibility configuration.
///
/// `sources` is ordered: when several entries match a name by substring, the
/// first one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCredibility {
    pub sources: Vec<SourceScore>,
    pub fact_checkers: Vec<String>,
    /// Score given to a source recognised only as a fact-checker.
    pub fact_checker_score: f64,
    /// Score for sources matching nothing.
    pub default_score: f64,
    /// Scores at or above this are credible.
    pub credible_threshold: f64,
    /// Scores below this are questionable.
    pub questionable_threshold: f64,
    /// Minimum acceptable share of credible members.
    pub min_credible_ratio: f64,
    pub non_credible_weight: f64,
    pub questionable_weight: f64,
    pub fact_checker_bonus: f64,
    pub majority_bonus: f64,
    pub majority_ratio: f64,
}

impl Default for SourceCredibility {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SourceCredibility {
    /// The product's default table.
    pub fn builtin() -> Self {
        let sources = [
            ("BBC News", 0.95),
            ("Reuters", 0.95),
            ("Reuters Health", 0.95),
            ("AP News", 0.95),
            ("Associated Press", 0.95),
            ("CNN", 0.90),
            ("The Guardian", 0.90),
            ("The New York Times", 0.90),
            ("The Washington Post", 0.90),
            ("Wall Street Journal", 0.90),
            ("NPR", 0.90),
            ("PBS", 0.90),
            ("BBC", 0.95),
            ("Firstpost", 0.70),
            ("India Today", 0.75),
            ("The Hindu", 0.80),
            ("The Times of India", 0.75),
            ("Hindustan Times", 0.75),
            ("Tavily Search", 0.50),
            ("Social Media", 0.30),
            ("Blog", 0.40),
            ("Unknown", 0.30),
        ]
        .into_iter()
        .map(|(name, score)| SourceScore::new(name, score))
        .collect();

        let fact_checkers = [
            "Fact Check Organization",
            "Snopes",
            "PolitiFact",
            "FactCheck.org",
            "AFP Fact Check",
            "Reuters Fact Check",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            sources,
            fact_checkers,
            fact_checker_score: 0.95,
            default_score: 0.5,
            credible_threshold: 0.7,
            questionable_threshold: 0.5,
            min_credible_ratio: 0.3,
            non_credible_weight: 0.4,
            questionable_weight: 0.3,
            fact_checker_bonus: 0.2,
            majority_bonus: 0.15,
            majority_ratio: 0.5,
        }
    }

    /// Credibility of a named source.
    ///
    /// A blank name scores as `Unknown`. Otherwise exact match first, then
    /// case-insensitive substring in either direction, then fact-checker
    /// names, then the default.
    pub fn score(&self, source: &str) -> f64 {
        let source = if source.trim().is_empty() { UNKNOWN_SOURCE } else { source };
        if let Some(entry) = self.sources.iter().find(|s| s.name == source) {
            return entry.score;
        }

        let lower = source.to_lowercase();
        if let Some(entry) = self.sources.iter().find(|s| {
            let known = s.name.to_lowercase();
            known.contains(&lower) || lower.contains(&known)
        }) {
            return entry.score;
        }

        if self.is_fact_checker(source) {
            return self.fact_checker_score;
        }
        self.default_score
    }

    /// Whether `source` mentions a known fact-checking organisation.
    /// Used for scoring only.
    pub fn is_fact_checker(&self, source: &str) -> bool {
        let lower = source.to_lowercase();
        self.fact_checkers
            .iter()
            .any(|fc| lower.contains(&fc.to_lowercase()))
    }

    /// Whether `source` is exactly one of the listed fact-checkers.
    pub fn is_listed_fact_checker(&self, source: &str) -> bool {
        self.fact_checkers.iter().any(|fc| fc == source)
    }
}

/// Credibility analysis of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilitySignal {
    pub credible_sources: Vec<String>,
    pub questionable_sources: Vec<String>,
    pub credible_ratio: f64,
    pub credible_count: usize,
    pub questionable_count: usize,
    pub source_diversity: usize,
    pub total_sources: usize,
    pub source_breakdown: BTreeMap<String, usize>,
    pub fact_checkers_present: bool,
    pub meets_credibility_threshold: bool,
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient: Option<InsufficientData>,
}

impl RiskSignal for CredibilitySignal {
    fn risk_score(&self) -> f64 {
        self.risk_score
    }

    fn indicator(&self) -> bool {
        self.meets_credibility_threshold
    }

    fn insufficient(&self) -> Option<InsufficientData> {
        self.insufficient
    }
}

/// Scores a cluster by where its members come from.
#[derive(Debug, Clone, Default)]
pub struct CredibilityAnalyzer {
    table: SourceCredibility,
}

impl CredibilityAnalyzer {
    pub fn new(table: SourceCredibility) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SourceCredibility {
        &self.table
    }
}

impl SignalAnalyzer for CredibilityAnalyzer {
    type Signal = CredibilitySignal;

    fn analyze(&self, datapoints: &[Datapoint]) -> InputResult<CredibilitySignal> {
        let t = &self.table;
        if datapoints.is_empty() {
            return Ok(CredibilitySignal {
                credible_sources: Vec::new(),
                questionable_sources: Vec::new(),
                credible_ratio: 0.0,
                credible_count: 0,
                questionable_count: 0,
                source_diversity: 0,
                total_sources: 0,
                source_breakdown: BTreeMap::new(),
                fact_checkers_present: false,
                meets_credibility_threshold: false,
                risk_score: 1.0,
                insufficient: Some(InsufficientData::NoDatapoints),
            });
        }

        let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut credible: BTreeSet<String> = BTreeSet::new();
        let mut questionable: BTreeSet<String> = BTreeSet::new();
        let (mut credible_count, mut questionable_count) = (0usize, 0usize);

        for datapoint in datapoints {
            let source = datapoint.source();
            *breakdown.entry(source.to_string()).or_default() += 1;

            let score = t.score(source);
            if score >= t.credible_threshold {
                credible_count += 1;
                credible.insert(source.to_string());
            } else if score < t.questionable_threshold {
                questionable_count += 1;
                questionable.insert(source.to_string());
            }
        }

        let total = datapoints.len();
        let credible_ratio = credible_count as f64 / total as f64;
        let fact_checkers_present = breakdown.keys().any(|s| t.is_listed_fact_checker(s));

        let base = (1.0 - credible_ratio) * t.non_credible_weight;
        let questionable_risk = (questionable_count as f64 / total as f64).min(1.0) * t.questionable_weight;

        // Bonuses do not stack: take the larger applicable reduction.
        let mut bonus: f64 = 0.0;
        if fact_checkers_present {
            bonus = bonus.max(t.fact_checker_bonus);
        }
        if credible_ratio >= t.majority_ratio {
            bonus = bonus.max(t.majority_bonus);
        }

        Ok(CredibilitySignal {
            credible_sources: credible.into_iter().collect(),
            questionable_sources: questionable.into_iter().collect(),
            credible_ratio,
            credible_count,
            questionable_count,
            source_diversity: breakdown.len(),
            total_sources: total,
            source_breakdown: breakdown,
            fact_checkers_present,
            meets_credibility_threshold: credible_ratio >= t.min_credible_ratio,
            risk_score: unit(base + questionable_risk - bonus),
            insufficient: None,
        })
    }

    fn name(&self) -> &'static str {
        "credibility"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(source: &str, i: usize) -> Datapoint {
        Datapoint::new(format!("dp-{}", i), "t").with_source(source)
    }

    #[test]
    fn score_resolution_order() {
        let table = SourceCredibility::builtin();
        assert_eq!(table.score("CNN"), 0.90);
        // substring, table order: "BBC News" precedes "BBC"
        assert_eq!(table.score("bbc"), 0.95);
        assert_eq!(table.score("Firstpost Live"), 0.70);
        // fact-checker names not in the table
        assert_eq!(table.score("Snopes Weekly"), 0.95);
        assert_eq!(table.score("Some Random Outlet"), 0.5);
    }

    #[test]
    fn blank_name_scores_as_unknown() {
        let table = SourceCredibility::builtin();
        assert_eq!(table.score(""), 0.30);
        assert_eq!(table.score("   "), 0.30);
        assert_eq!(table.score(""), table.score("Unknown"));
    }

    #[test]
    fn fact_checker_presence_needs_an_exact_name() {
        let analyzer = CredibilityAnalyzer::default();
        let near = analyzer
            .analyze(&[from("Reuters", 0), from("Snopes Weekly", 1)])
            .unwrap();
        assert!(!near.fact_checkers_present);
        let exact = analyzer
            .analyze(&[from("Reuters", 0), from("Snopes", 1)])
            .unwrap();
        assert!(exact.fact_checkers_present);
        // scoring still recognises the mention
        assert_eq!(SourceCredibility::builtin().score("Snopes Weekly"), 0.95);
    }

    #[test]
    fn empty_source_is_unknown() {
        let signal = CredibilityAnalyzer::default()
            .analyze(&[from("", 0), from("  ", 1)])
            .unwrap();
        assert_eq!(signal.source_breakdown.get("Unknown"), Some(&2));
        assert_eq!(signal.questionable_sources, vec!["Unknown".to_string()]);
        assert_eq!(signal.questionable_count, 2);
    }

    #[test]
    fn credible_cluster_with_fact_checker_is_low_risk() {
        let mut points: Vec<Datapoint> = (0..9).map(|i| from("Reuters", i)).collect();
        points.push(from("Reuters Fact Check", 9));
        let signal = CredibilityAnalyzer::default().analyze(&points).unwrap();
        assert!(signal.fact_checkers_present);
        assert!(signal.risk_score <= 0.05);
        assert_eq!(signal.credible_ratio, 1.0);
        assert!(signal.meets_credibility_threshold);
    }

    #[test]
    fn questionable_cluster_risk() {
        let points: Vec<Datapoint> = (0..4).map(|i| from("Social Media", i)).collect();
        let signal = CredibilityAnalyzer::default().analyze(&points).unwrap();
        // 0.4 * (1 - 0) + 0.3 * 1.0
        assert!((signal.risk_score - 0.7).abs() < 1e-12);
        assert!(!signal.meets_credibility_threshold);
        assert_eq!(signal.source_diversity, 1);
    }

    #[test]
    fn majority_bonus_applies_without_fact_checkers() {
        let points = vec![from("BBC", 0), from("Blog", 1)];
        let signal = CredibilityAnalyzer::default().analyze(&points).unwrap();
        // 0.4 * 0.5 + 0.3 * 0.5 - 0.15
        assert!((signal.risk_score - 0.2).abs() < 1e-12);
        assert!(!signal.fact_checkers_present);
    }

    #[test]
    fn empty_cluster_is_maximal_risk() {
        let signal = CredibilityAnalyzer::default().analyze(&[]).unwrap();
        assert_eq!(signal.risk_score, 1.0);
        assert_eq!(signal.insufficient, Some(InsufficientData::NoDatapoints));
    }

    #[test]
    fn custom_table_is_honoured() {
        let table = SourceCredibility {
            sources: vec![SourceScore::new("Gazette", 0.2)],
            fact_checkers: Vec::new(),
            ..SourceCredibility::builtin()
        };
        let signal = CredibilityAnalyzer::new(table)
            .analyze(&[from("Gazette", 0), from("Gazette", 1)])
            .unwrap();
        assert_eq!(signal.questionable_count, 2);
    }
}
