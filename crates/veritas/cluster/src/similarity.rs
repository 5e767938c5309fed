//! Cosine similarity and embedding validation.

use tracing::debug;
pub use veritas_types::cosine_similarity;
use veritas_types::{Datapoint, InputError, InputResult};

/// Cosine distance `1 - cos`, in `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Datapoints carrying a usable embedding, in input order.
///
/// Missing and empty embeddings are skipped. Mixed dimensionality among the
/// retained embeddings is rejected rather than producing degenerate distances.
pub fn valid_embeddings(datapoints: &[Datapoint]) -> InputResult<Vec<&Datapoint>> {
    let mut valid: Vec<&Datapoint> = Vec::with_capacity(datapoints.len());
    let mut expected: Option<usize> = None;

    for datapoint in datapoints {
        let Some(embedding) = datapoint.valid_embedding() else {
            debug!(datapoint_id = %datapoint.id, "skipping datapoint without embedding");
            continue;
        };
        match expected {
            None => expected = Some(embedding.len()),
            Some(dim) if dim != embedding.len() => {
                return Err(InputError::DimensionMismatch {
                    datapoint_id: datapoint.id.clone(),
                    expected: dim,
                    found: embedding.len(),
                });
            }
            Some(_) => {}
        }
        valid.push(datapoint);
    }

    Ok(valid)
}
