use chrono::{DateTime, Utc};
use tracing::debug;
use veritas_types::Datapoint;

/// Datapoints with a parsable timestamp, oldest first (ties by id).
pub(crate) fn chronological(datapoints: &[Datapoint]) -> Vec<(DateTime<Utc>, &Datapoint)> {
    let mut timed: Vec<(DateTime<Utc>, &Datapoint)> = datapoints
        .iter()
        .filter_map(|dp| match dp.published() {
            Some(ts) => Some((ts, dp)),
            None => {
                debug!(datapoint_id = %dp.id, "no parsable timestamp");
                None
            }
        })
        .collect();
    timed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    timed
}

/// Fractional hours between two instants.
pub(crate) fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}
