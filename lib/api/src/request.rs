//! Inbound scoring request parsing
//!
//! Only field presence is validated. Everything else is read leniently:
//! metric values go through feature coercion and a `books` value that is
//! not an array counts as an empty candidate list.

use bookmatch_core::{Candidate, Error, FeatureVector, JobId, Result, ScoringJob};
use serde_json::Value;
use tracing::warn;

/// Build a scoring job from a request body.
///
/// The body must be an object with a non-null `id` and a `books` key.
/// The target vector is read from the metric keys at the root of the body.
pub fn parse_scoring_request(payload: &Value) -> Result<ScoringJob> {
    let fields = payload.as_object().ok_or(Error::MissingFields)?;

    let id = fields
        .get("id")
        .and_then(JobId::from_json)
        .ok_or(Error::MissingFields)?;
    let books = fields.get("books").ok_or(Error::MissingFields)?;

    let candidates = match books {
        Value::Array(items) => items.iter().map(Candidate::from_json).collect(),
        Value::Null => Vec::new(),
        other => {
            warn!(job_id = %id, "Ignoring non-array books value: {}", other);
            Vec::new()
        }
    };

    let target = FeatureVector::from_json(payload);
    Ok(ScoringJob::new(id, target, candidates))
}
