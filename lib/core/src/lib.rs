//! # bookmatch Core
//!
//! Core library for the bookmatch scoring service.
//!
//! This crate provides the data model and the execution machinery:
//!
//! - [`FeatureVector`] - The four stylometric metrics, leniently coerced from JSON
//! - [`Candidate`] - An opaque book id with its feature vector
//! - [`ScoringJob`] - A target vector plus the candidates to score against it
//! - [`ScoreResult`] - Aggregate or per-candidate outcome, serialized as the callback body
//! - [`WorkerPool`] - Bounded-concurrency executor with a completion contract
//!
//! ## Example
//!
//! ```rust
//! use bookmatch_core::{Candidate, FeatureVector, JobId, ScoringJob};
//! use serde_json::json;
//!
//! let target = FeatureVector::from_json(&json!({"avg_word_len": 5.0}));
//! let candidate = Candidate::from_json(&json!({"book_id": "b1", "avg_word_len": 5.0}));
//! let job = ScoringJob::new(JobId::new("42"), target, vec![candidate]);
//! assert_eq!(job.candidates.len(), 1);
//! ```

pub mod error;
pub mod feature;
pub mod job;
pub mod pool;

pub use error::{Error, Result};
pub use feature::{Candidate, FeatureVector, Metric, MetricValue};
pub use job::{
    format_percentage, CallbackPayload, CandidateScore, JobId, JobStatus, OutputMode,
    ScoreResult, ScoringJob,
};
pub use pool::{CompletionHandler, JobRunner, PoolConfig, PoolStats, WorkerPool};
