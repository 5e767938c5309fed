//! Property tests for the combined risk assessment.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use veritas_risk::RiskEngine;
use veritas_types::{ClusterId, Datapoint};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TITLES: &[&str] = &[
    "Bridge closure confirmed",
    "Bridge closure false",
    "Bridge closure debunked",
    "Storm surge expected tonight",
    "Storm surge rumors denied",
    "Market rally continues",
];

const SOURCES: &[&str] = &["Reuters", "Blog", "Social Media", "Snopes", ""];

fn arb_member(index: usize) -> impl Strategy<Value = Datapoint> {
    (prop::sample::select(TITLES), prop::sample::select(SOURCES), 0u32..48).prop_map(
        move |(title, source, hour)| {
            Datapoint::new(format!("dp-{:02}", index), title)
                .with_source(source)
                .with_published_at(
                    Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
                        + Duration::hours(i64::from(hour)),
                )
        },
    )
}

fn arb_cluster() -> impl Strategy<Value = Vec<Datapoint>> {
    (1usize..25).prop_flat_map(|n| (0..n).map(arb_member).collect::<Vec<_>>())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The overall score stays in [0, 1] and agrees with its level and flags.
    #[test]
    fn assessment_is_consistent(members in arb_cluster()) {
        let engine = RiskEngine::default();
        let analysis = engine.assess(&ClusterId::new("c"), &members).unwrap();

        prop_assert!((0.0..=1.0).contains(&analysis.overall_risk_score));
        prop_assert_eq!(analysis.risk_level, engine.policy().level(analysis.overall_risk_score));
        prop_assert_eq!(analysis.flag_count, analysis.flags.count());
        prop_assert_eq!(analysis.datapoint_count, members.len());
        prop_assert_eq!(analysis.flags.rapid_growth, analysis.growth_analysis.is_rapid_growth);
        if analysis.flags.has_contradictions {
            prop_assert!(analysis.contradiction_analysis.contradiction_count > 2);
        }
    }

    /// Re-assessing the same members yields the same record.
    #[test]
    fn assessment_is_deterministic(members in arb_cluster()) {
        let engine = RiskEngine::default();
        let id = ClusterId::new("c");
        prop_assert_eq!(
            engine.assess(&id, &members).unwrap(),
            engine.assess(&id, &members).unwrap()
        );
    }
}
