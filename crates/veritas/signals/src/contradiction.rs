//! Internal contradiction signal.
//!
//! Two independent detection routes feed one de-duplicated pair list:
//!
//! 1. **Embedding**: same-topic pairs (cosine similarity at or above the
//!    threshold) whose claims carry opposite keywords of an antonym pair.
//! 2. **Lexical**: a claim whose title carries a red-flag term, paired with
//!    every other claim whose title shares enough vocabulary.
//!
//! Differing angles are normal in legitimate coverage, so only a high ratio
//! of contradictory pairs to members produces substantial risk.

use crate::analyzer::{ramp, unit, RiskSignal, SignalAnalyzer};
use crate::text::{first_sentence, jaccard, truncate_chars, words};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use veritas_types::{
    cosine_similarity, Datapoint, DatapointId, InputError, InputResult, InsufficientData,
};

const CLAIM_SENTENCE_CHARS: usize = 200;
const EXCERPT_CHARS: usize = 150;
const SAMPLE_TITLE_CHARS: usize = 50;
const MAX_PAIRS: usize = 10;
const MAX_SAMPLES: usize = 3;

/// Immutable keyword configuration for contradiction detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionLexicon {
    /// Opposing keywords; a pair contradicts when each claim holds one side.
    pub antonym_pairs: Vec<(String, String)>,
    /// Title terms that mark a claim as disputing something.
    pub red_flags: Vec<String>,
    /// Words ignored when comparing title vocabulary.
    pub stopwords: BTreeSet<String>,
    /// Minimum embedding similarity for the same-topic test.
    pub similarity_threshold: f64,
    /// Title vocabulary overlap must exceed this.
    pub topic_overlap: f64,
    /// Pair ratio above which risk ramps up steeply.
    pub ratio_floor: f64,
    /// Risk per unit ratio at or below `ratio_floor`.
    pub isolated_weight: f64,
    /// Match antonyms on whole words instead of lower-cased substrings.
    pub whole_word_antonyms: bool,
}

impl Default for ContradictionLexicon {
    fn default() -> Self {
        let pairs = [
            ("false", "true"),
            ("debunked", "confirmed"),
            ("denied", "confirmed"),
            ("not", "is"),
            ("no", "yes"),
            ("unfounded", "verified"),
            ("rumor", "fact"),
            ("misinformation", "verified"),
        ];
        let red_flags = [
            "false",
            "debunked",
            "unfounded",
            "prove unfounded",
            "rumors",
            "misinformation",
            "disproven",
            "incorrect",
            "wrong",
            "not true",
            "denied",
            "rejected",
        ];
        let stopwords = [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        ];

        Self {
            antonym_pairs: pairs
                .into_iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            red_flags: red_flags.into_iter().map(String::from).collect(),
            stopwords: stopwords.into_iter().map(String::from).collect(),
            similarity_threshold: 0.7,
            topic_overlap: 0.3,
            ratio_floor: 0.2,
            isolated_weight: 0.5,
            whole_word_antonyms: false,
        }
    }
}

impl ContradictionLexicon {
    /// Whether one text holds one side of an antonym pair and the other text
    /// holds the opposite side.
    ///
    /// Matching is lower-cased substring containment, so "is" also hits
    /// "this". Set `whole_word_antonyms` to match whole words only.
    pub fn has_antonyms(&self, a: &str, b: &str) -> bool {
        if self.whole_word_antonyms {
            let (wa, wb) = (words(a), words(b));
            return self.antonym_pairs.iter().any(|(x, y)| {
                (wa.contains(x) && wb.contains(y)) || (wa.contains(y) && wb.contains(x))
            });
        }
        let (la, lb) = (a.to_lowercase(), b.to_lowercase());
        self.antonym_pairs.iter().any(|(x, y)| {
            (la.contains(x.as_str()) && lb.contains(y.as_str()))
                || (la.contains(y.as_str()) && lb.contains(x.as_str()))
        })
    }

    /// Whether a title carries a red-flag term.
    pub fn is_red_flagged(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.red_flags.iter().any(|flag| lower.contains(flag.as_str()))
    }

    /// Jaccard overlap of two titles' whitespace tokens, stop-words removed.
    pub fn title_overlap(&self, a: &str, b: &str) -> f64 {
        let tokens = |s: &str| -> BTreeSet<String> {
            s.split_whitespace()
                .map(str::to_lowercase)
                .filter(|w| !self.stopwords.contains(w))
                .collect()
        };
        jaccard(&tokens(a), &tokens(b))
    }
}

/// Coarse category of a contradictory pair, judged from the first claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    FactCheckVsClaim,
    RumorVsFact,
    DenialVsClaim,
    ConflictingClaims,
}

impl ContradictionKind {
    pub fn classify(claim: &str) -> Self {
        let lower = claim.to_lowercase();
        let has = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));
        if has(&["false", "debunked"]) {
            ContradictionKind::FactCheckVsClaim
        } else if has(&["rumor", "misinformation"]) {
            ContradictionKind::RumorVsFact
        } else if has(&["denied", "rejected"]) {
            ContradictionKind::DenialVsClaim
        } else {
            ContradictionKind::ConflictingClaims
        }
    }
}

/// How a pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum DetectionRoute {
    Embedding { similarity: f64 },
    Lexical { overlap: f64 },
}

/// One side of a contradictory pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRef {
    pub id: DatapointId,
    pub title: String,
    pub source: String,
    /// Leading characters of the claim text.
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionPair {
    pub claim1: ClaimRef,
    pub claim2: ClaimRef,
    pub detection: DetectionRoute,
    pub kind: ContradictionKind,
}

/// Contradiction analysis of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionSignal {
    pub has_contradictions: bool,
    /// Distinct contradictory pairs found (before the listing cap).
    pub contradiction_count: usize,
    pub contradiction_pairs: Vec<ContradictionPair>,
    pub sample_contradictions: Vec<String>,
    pub total_datapoints: usize,
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient: Option<InsufficientData>,
}

impl RiskSignal for ContradictionSignal {
    fn risk_score(&self) -> f64 {
        self.risk_score
    }

    fn indicator(&self) -> bool {
        self.has_contradictions
    }

    fn insufficient(&self) -> Option<InsufficientData> {
        self.insufficient
    }
}

struct Claim<'a> {
    datapoint: &'a Datapoint,
    text: String,
}

impl<'a> Claim<'a> {
    fn new(datapoint: &'a Datapoint) -> Self {
        let sentence = truncate_chars(first_sentence(&datapoint.content), CLAIM_SENTENCE_CHARS);
        Self {
            datapoint,
            text: format!("{}. {}", datapoint.title, sentence),
        }
    }

    fn reference(&self) -> ClaimRef {
        ClaimRef {
            id: self.datapoint.id.clone(),
            title: self.datapoint.title.clone(),
            source: self.datapoint.source().to_string(),
            excerpt: truncate_chars(&self.text, EXCERPT_CHARS).to_string(),
        }
    }
}

/// Finds claims within a cluster that dispute one another.
#[derive(Debug, Clone, Default)]
pub struct ContradictionAnalyzer {
    lexicon: ContradictionLexicon,
}

impl ContradictionAnalyzer {
    pub fn new(lexicon: ContradictionLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &ContradictionLexicon {
        &self.lexicon
    }

    fn embedding_pairs(&self, claims: &[Claim<'_>]) -> InputResult<Vec<ContradictionPair>> {
        let embedded: Vec<(&Claim<'_>, &[f32])> = claims
            .iter()
            .filter_map(|c| c.datapoint.valid_embedding().map(|e| (c, e)))
            .collect();

        if let Some((_, first)) = embedded.first() {
            let expected = first.len();
            if let Some((claim, e)) = embedded.iter().find(|(_, e)| e.len() != expected) {
                return Err(InputError::DimensionMismatch {
                    datapoint_id: claim.datapoint.id.clone(),
                    expected,
                    found: e.len(),
                });
            }
        }

        let mut pairs = Vec::new();
        for (i, (a, ea)) in embedded.iter().enumerate() {
            for (b, eb) in &embedded[i + 1..] {
                let similarity = cosine_similarity(ea, eb);
                if similarity >= self.lexicon.similarity_threshold
                    && self.lexicon.has_antonyms(&a.text, &b.text)
                {
                    pairs.push(ContradictionPair {
                        claim1: a.reference(),
                        claim2: b.reference(),
                        detection: DetectionRoute::Embedding { similarity },
                        kind: ContradictionKind::classify(&a.text),
                    });
                }
            }
        }
        Ok(pairs)
    }

    fn lexical_pairs(&self, claims: &[Claim<'_>]) -> Vec<ContradictionPair> {
        let mut pairs = Vec::new();
        for flagged in claims
            .iter()
            .filter(|c| self.lexicon.is_red_flagged(&c.datapoint.title))
        {
            for other in claims.iter().filter(|o| o.datapoint.id != flagged.datapoint.id) {
                let overlap = self
                    .lexicon
                    .title_overlap(&flagged.datapoint.title, &other.datapoint.title);
                if overlap > self.lexicon.topic_overlap {
                    pairs.push(ContradictionPair {
                        claim1: flagged.reference(),
                        claim2: other.reference(),
                        detection: DetectionRoute::Lexical { overlap },
                        kind: ContradictionKind::FactCheckVsClaim,
                    });
                }
            }
        }
        pairs
    }

    fn risk(&self, pair_count: usize, total: usize) -> f64 {
        if pair_count == 0 {
            return 0.0;
        }
        let floor = self.lexicon.ratio_floor;
        let ratio = pair_count as f64 / total.max(1) as f64;
        if ratio > floor {
            ramp(ratio, floor, 1.0 - floor)
        } else {
            unit(ratio * self.lexicon.isolated_weight)
        }
    }
}

impl SignalAnalyzer for ContradictionAnalyzer {
    type Signal = ContradictionSignal;

    fn analyze(&self, datapoints: &[Datapoint]) -> InputResult<ContradictionSignal> {
        let total = datapoints.len();
        if total < 2 {
            return Ok(ContradictionSignal {
                has_contradictions: false,
                contradiction_count: 0,
                contradiction_pairs: Vec::new(),
                sample_contradictions: Vec::new(),
                total_datapoints: total,
                risk_score: 0.0,
                insufficient: Some(InsufficientData::TooFewDatapoints),
            });
        }

        let claims: Vec<Claim<'_>> = datapoints.iter().map(Claim::new).collect();

        let mut seen: BTreeSet<(DatapointId, DatapointId)> = BTreeSet::new();
        let mut unique: Vec<ContradictionPair> = Vec::new();
        for pair in self
            .embedding_pairs(&claims)?
            .into_iter()
            .chain(self.lexical_pairs(&claims))
        {
            let (a, b) = (pair.claim1.id.clone(), pair.claim2.id.clone());
            let key = if a <= b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                unique.push(pair);
            }
        }

        let contradiction_count = unique.len();
        let sample_contradictions = unique
            .iter()
            .take(MAX_SAMPLES)
            .map(|p| {
                format!(
                    "{}... vs {}...",
                    truncate_chars(&p.claim1.title, SAMPLE_TITLE_CHARS),
                    truncate_chars(&p.claim2.title, SAMPLE_TITLE_CHARS)
                )
            })
            .collect();
        unique.truncate(MAX_PAIRS);

        Ok(ContradictionSignal {
            has_contradictions: contradiction_count > 0,
            contradiction_count,
            contradiction_pairs: unique,
            sample_contradictions,
            total_datapoints: total,
            risk_score: self.risk(contradiction_count, total),
            insufficient: None,
        })
    }

    fn name(&self) -> &'static str {
        "contradiction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dp(id: &str, title: &str) -> Datapoint {
        Datapoint::new(id, title).with_source("Reuters")
    }

    #[test]
    fn antonyms_match_lowercased_substrings() {
        let lexicon = ContradictionLexicon::default();
        assert!(lexicon.has_antonyms("The claim is FALSE", "It is true"));
        // "true" inside "untrue", "false" inside "falsehood"
        assert!(lexicon.has_antonyms("Claim is untrue", "Report marked falsehood"));
        // "is" inside "this", "not" inside "Nothing"
        assert!(lexicon.has_antonyms("Witnesses say this happened", "Nothing happened there"));
        assert!(!lexicon.has_antonyms("Bridge reopened", "Traffic resumed"));
    }

    #[test]
    fn whole_word_antonyms_ignore_embedded_keywords() {
        let lexicon = ContradictionLexicon {
            whole_word_antonyms: true,
            ..ContradictionLexicon::default()
        };
        assert!(lexicon.has_antonyms("The claim is false", "It is true"));
        assert!(!lexicon.has_antonyms("Claim is untrue", "Report marked falsehood"));
        assert!(!lexicon.has_antonyms("Witnesses say this happened", "Nothing happened there"));
    }

    #[test]
    fn whole_word_option_defaults_off_in_config() {
        let lexicon: ContradictionLexicon = serde_json::from_str("{}").unwrap();
        assert!(!lexicon.whole_word_antonyms);
    }

    #[test]
    fn kind_classification() {
        assert_eq!(
            ContradictionKind::classify("Report debunked by experts"),
            ContradictionKind::FactCheckVsClaim
        );
        assert_eq!(
            ContradictionKind::classify("Rumor spreads online"),
            ContradictionKind::RumorVsFact
        );
        assert_eq!(
            ContradictionKind::classify("Ministry denied the report"),
            ContradictionKind::DenialVsClaim
        );
        assert_eq!(
            ContradictionKind::classify("Two accounts differ"),
            ContradictionKind::ConflictingClaims
        );
    }

    #[test]
    fn lexical_route_pairs_red_flag_with_related_title() {
        let points = vec![
            dp("a", "Bridge collapse claims debunked"),
            dp("b", "Bridge collapse claims spread"),
            dp("c", "Weather forecast sunny"),
        ];
        let signal = ContradictionAnalyzer::default().analyze(&points).unwrap();
        assert_eq!(signal.contradiction_count, 1);
        let pair = &signal.contradiction_pairs[0];
        assert_eq!(pair.claim1.id.as_str(), "a");
        assert_eq!(pair.claim2.id.as_str(), "b");
        assert_eq!(pair.kind, ContradictionKind::FactCheckVsClaim);
        assert!(matches!(pair.detection, DetectionRoute::Lexical { .. }));
        // ratio 1/3 > 0.2
        assert!((signal.risk_score - (1.0 / 3.0 - 0.2) / 0.8).abs() < 1e-12);
    }

    #[test]
    fn embedding_route_needs_similarity_and_antonyms() {
        let points = vec![
            dp("a", "Vaccine report true").with_embedding(vec![1.0, 0.0]),
            dp("b", "Vaccine report false").with_embedding(vec![0.9, 0.1]),
            dp("c", "Vaccine report true").with_embedding(vec![0.0, 1.0]),
        ];
        let signal = ContradictionAnalyzer::default().analyze(&points).unwrap();
        let ids: Vec<_> = signal
            .contradiction_pairs
            .iter()
            .map(|p| (p.claim1.id.as_str(), p.claim2.id.as_str()))
            .collect();
        // embedding route finds (a, b); lexical adds (b, c) since "b" is red-flagged
        assert_eq!(ids, vec![("a", "b"), ("b", "c")]);
        assert!(matches!(
            signal.contradiction_pairs[0].detection,
            DetectionRoute::Embedding { .. }
        ));
    }

    #[test]
    fn zero_norm_embeddings_never_pair() {
        let aligned = vec![
            dp("a", "Council vote is set").with_embedding(vec![1.0, 0.0]),
            dp("b", "Council vote not set").with_embedding(vec![1.0, 0.0]),
        ];
        let zeroed = vec![
            dp("a", "Council vote is set").with_embedding(vec![0.0, 0.0]),
            dp("b", "Council vote not set").with_embedding(vec![0.0, 0.0]),
        ];
        let analyzer = ContradictionAnalyzer::default();
        assert_eq!(analyzer.analyze(&aligned).unwrap().contradiction_count, 1);
        assert_eq!(analyzer.analyze(&zeroed).unwrap().contradiction_count, 0);
    }

    #[test]
    fn pairs_are_deduplicated_across_routes() {
        let points = vec![
            dp("a", "Outage rumors false").with_embedding(vec![1.0, 0.0]),
            dp("b", "Outage rumors true").with_embedding(vec![1.0, 0.0]),
        ];
        let signal = ContradictionAnalyzer::default().analyze(&points).unwrap();
        assert_eq!(signal.contradiction_count, 1);
        assert!(matches!(
            signal.contradiction_pairs[0].detection,
            DetectionRoute::Embedding { .. }
        ));
    }

    #[test]
    fn mismatched_embeddings_are_rejected() {
        let points = vec![
            dp("a", "x").with_embedding(vec![1.0, 0.0]),
            dp("b", "y").with_embedding(vec![1.0, 0.0, 0.0]),
        ];
        assert!(matches!(
            ContradictionAnalyzer::default().analyze(&points),
            Err(InputError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn single_datapoint_is_insufficient() {
        let signal = ContradictionAnalyzer::default()
            .analyze(&[dp("a", "alone")])
            .unwrap();
        assert_eq!(signal.insufficient, Some(InsufficientData::TooFewDatapoints));
        assert_eq!(signal.risk_score, 0.0);
    }

    #[test]
    fn claim_text_uses_first_sentence() {
        let datapoint = Datapoint::new("a", "Title").with_content("First part. Second part.");
        let claim = Claim::new(&datapoint);
        assert_eq!(claim.text, "Title. First part");
    }
}
