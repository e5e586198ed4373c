//! # bookmatch
//!
//! An asynchronous similarity scoring service for books.
//!
//! A caller posts a target style (four stylometric metrics) together with a
//! list of candidate books. The request is acknowledged immediately; a bounded
//! worker pool scores each candidate with a normalized Canberra distance and
//! the result is delivered to the caller with an HTTP callback.
//!
//! ## Quick Start
//!
//! ```bash
//! bookmatch --secret-key secret12 --callback-url http://localhost:8090/api/analysebookscalc/
//! curl -X POST localhost:8000/api/start_analysis \
//!   -H 'content-type: application/json' \
//!   -d '{"id": "42", "avg_word_len": 5, "books": [{"book_id": "b1", "avg_word_len": 5}]}'
//! ```
//!
//! ## Crate Structure
//!
//! - `bookmatch-core` - Feature vectors, scoring jobs, results, and the worker pool
//! - `bookmatch-similarity` - Canberra similarity and the job runner
//! - `bookmatch-callback` - Best-effort HTTP callback delivery
//! - `bookmatch-api` - REST API accepting scoring requests
//!
//! ## Output Modes
//!
//! - **Aggregate**: `{"status": 4, "response": "100.00%"}`, accepted when the
//!   mean similarity exceeds the threshold, rejected (5) otherwise
//! - **Per-candidate**: `{"status": 3, "book_results": [{"book_id": .., "similarity": ..}]}`

// Re-export core types
pub use bookmatch_core::{
    Candidate, FeatureVector, Metric, MetricValue,
    JobId, ScoringJob, ScoreResult, JobStatus, OutputMode, CandidateScore, CallbackPayload,
    WorkerPool, PoolConfig, PoolStats, JobRunner, CompletionHandler,
    Error, Result,
};

// Re-export scoring
pub use bookmatch_similarity::{canberra_similarity, Scorer, DEFAULT_THRESHOLD};

// Re-export callback delivery
pub use bookmatch_callback::{CallbackConfig, CallbackDispatcher, CallbackError};

// Re-export API
pub use bookmatch_api::{ApiConfig, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Candidate, FeatureVector, ScoringJob, ScoreResult, OutputMode,
        WorkerPool, PoolConfig, Scorer,
        CallbackConfig, CallbackDispatcher,
        ApiConfig, RestApi,
        Error, Result,
    };
}
