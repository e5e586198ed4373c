//! Scoring jobs and their results

use crate::feature::{Candidate, FeatureVector};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Opaque job identifier, later used as the callback target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an identifier from the request's `id` field.
    ///
    /// Strings are taken verbatim, anything else by its JSON text.
    /// Returns `None` for `null`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s.clone())),
            other => Some(Self(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of scoring work: a target and the candidates to compare it with
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringJob {
    pub id: JobId,
    pub target: FeatureVector,
    pub candidates: Vec<Candidate>,
}

impl ScoringJob {
    pub fn new(id: JobId, target: FeatureVector, candidates: Vec<Candidate>) -> Self {
        Self {
            id,
            target,
            candidates,
        }
    }
}

/// Domain status codes understood by the receiving service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Scored, decision left to the receiver
    Pending = 3,
    Accepted = 4,
    Rejected = 5,
}

impl JobStatus {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// How a job's similarities are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Mean similarity with an accept/reject decision
    #[default]
    Aggregate,
    /// Every candidate's similarity, no decision
    PerCandidate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub book_id: Value,
    pub similarity: f64,
}

/// Result of a scoring job, serialized as the callback body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreResult {
    Aggregate {
        status: JobStatus,
        response: String,
        #[serde(skip)]
        probability: f64,
    },
    /// Aggregate mode with no candidates to score
    NoData { status: JobStatus, probability: f64 },
    PerCandidate {
        status: JobStatus,
        book_results: Vec<CandidateScore>,
    },
    /// The job failed internally
    Failed { status: JobStatus },
}

impl ScoreResult {
    pub fn aggregate(probability: f64, threshold: f64) -> Self {
        let status = if probability > threshold {
            JobStatus::Accepted
        } else {
            JobStatus::Rejected
        };
        ScoreResult::Aggregate {
            status,
            response: format_percentage(probability),
            probability,
        }
    }

    pub fn no_data() -> Self {
        ScoreResult::NoData {
            status: JobStatus::Rejected,
            probability: 0.0,
        }
    }

    pub fn per_candidate(book_results: Vec<CandidateScore>) -> Self {
        ScoreResult::PerCandidate {
            status: JobStatus::Pending,
            book_results,
        }
    }

    pub fn failed() -> Self {
        ScoreResult::Failed {
            status: JobStatus::Rejected,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            ScoreResult::Aggregate { status, .. }
            | ScoreResult::NoData { status, .. }
            | ScoreResult::PerCandidate { status, .. }
            | ScoreResult::Failed { status } => *status,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScoreResult::Failed { .. })
    }
}

/// Format a probability in [0, 1] as a percentage with two decimals
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// A finished job ready to be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackPayload {
    pub job_id: JobId,
    pub result: ScoreResult,
}

impl CallbackPayload {
    pub fn new(job_id: JobId, result: ScoreResult) -> Self {
        Self { job_id, result }
    }

    pub fn status_code(&self) -> u8 {
        self.result.status().code()
    }
}
