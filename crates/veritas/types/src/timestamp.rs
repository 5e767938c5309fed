use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Naive formats accepted for text timestamps, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Publication time of a datapoint.
///
/// Upstream feeds deliver either a native timestamp or free text. Text is kept
/// verbatim and only parsed on demand, so an unparsable value stays visible on
/// the record instead of being defaulted away.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedAt {
    Instant(DateTime<Utc>),
    Text(String),
}

impl PublishedAt {
    /// Resolve to a UTC instant, or `None` if the text cannot be parsed.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            PublishedAt::Instant(ts) => Some(*ts),
            PublishedAt::Text(raw) => parse_text(raw.trim()),
        }
    }
}

impl From<DateTime<Utc>> for PublishedAt {
    fn from(value: DateTime<Utc>) -> Self {
        PublishedAt::Instant(value)
    }
}

fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `hours` as a duration, saturating at the longest representable span.
pub fn hours_span(hours: u32) -> Duration {
    Duration::try_hours(i64::from(hours)).unwrap_or(Duration::MAX)
}

/// The instant `hours` before `instant`, clamped to the earliest
/// representable instant. Look-back windows may be arbitrarily wide.
pub fn hours_before(instant: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    instant
        .checked_sub_signed(hours_span(hours))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resolves_native_and_text_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let cases = [
            PublishedAt::Instant(expected),
            PublishedAt::Text("2024-03-01T12:30:00Z".into()),
            PublishedAt::Text("2024-03-01T14:30:00+02:00".into()),
            PublishedAt::Text("Fri, 01 Mar 2024 12:30:00 +0000".into()),
            PublishedAt::Text("2024-03-01 12:30:00".into()),
            PublishedAt::Text("2024-03-01T12:30:00".into()),
        ];
        for case in cases {
            assert_eq!(case.resolve(), Some(expected), "{:?}", case);
        }
    }

    #[test]
    fn date_only_resolves_to_midnight() {
        let ts = PublishedAt::Text("2024-03-01".into()).resolve().unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_unresolved() {
        assert_eq!(PublishedAt::Text("yesterday-ish".into()).resolve(), None);
        assert_eq!(PublishedAt::Text("   ".into()).resolve(), None);
    }

    #[test]
    fn untagged_deserialization_keeps_unparsable_text() {
        let parsed: PublishedAt = serde_json::from_str("\"2024-03-01T12:30:00Z\"").unwrap();
        assert!(matches!(parsed, PublishedAt::Instant(_)));
        let raw: PublishedAt = serde_json::from_str("\"last tuesday\"").unwrap();
        assert_eq!(raw, PublishedAt::Text("last tuesday".into()));
    }

    #[test]
    fn unbounded_look_back_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(hours_before(now, 24), now - Duration::hours(24));
        assert_eq!(hours_before(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
        assert!(hours_span(u32::MAX) > Duration::hours(1_000_000));
    }
}
