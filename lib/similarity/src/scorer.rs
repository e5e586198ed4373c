//! Scoring job runner
//!
//! Scores every candidate of a job against its target and shapes the
//! outcome according to the configured output mode.

use crate::distance::canberra_similarity;
use bookmatch_core::{
    CandidateScore, Error, JobRunner, OutputMode, Result, ScoreResult, ScoringJob,
};
use tracing::info;

/// Default mean similarity a job must exceed to be accepted
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Runs scoring jobs for the worker pool
#[derive(Debug, Clone)]
pub struct Scorer {
    mode: OutputMode,
    threshold: f64,
}

impl Scorer {
    /// Create a scorer. The threshold must be a finite value in [0.0, 1.0].
    pub fn new(mode: OutputMode, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig(format!(
                "similarity threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { mode, threshold })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Similarity of every candidate, in request order
    pub fn score_candidates(&self, job: &ScoringJob) -> Vec<CandidateScore> {
        job.candidates
            .iter()
            .map(|candidate| CandidateScore {
                book_id: candidate.book_id.clone(),
                similarity: canberra_similarity(&job.target, &candidate.features),
            })
            .collect()
    }

    /// Mean similarity with an accept/reject decision
    pub fn score_aggregate(&self, job: &ScoringJob) -> ScoreResult {
        if job.candidates.is_empty() {
            return ScoreResult::no_data();
        }

        let total: f64 = job
            .candidates
            .iter()
            .map(|candidate| canberra_similarity(&job.target, &candidate.features))
            .sum();
        let probability = total / job.candidates.len() as f64;

        info!(
            job_id = %job.id,
            "Match probability: {:.2}%",
            probability * 100.0
        );

        ScoreResult::aggregate(probability, self.threshold)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            mode: OutputMode::Aggregate,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl JobRunner for Scorer {
    fn run(&self, job: &ScoringJob) -> Result<ScoreResult> {
        let result = match self.mode {
            OutputMode::Aggregate => self.score_aggregate(job),
            OutputMode::PerCandidate => ScoreResult::per_candidate(self.score_candidates(job)),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmatch_core::{Candidate, FeatureVector, JobId, JobStatus};
    use serde_json::json;

    fn create_test_job(candidates: Vec<serde_json::Value>) -> ScoringJob {
        let target = FeatureVector::from_json(&json!({
            "avg_word_len": 5.0,
            "lexical_diversity": 0.6,
            "conjunction_freq": 0.04,
            "avg_sentence_len": 15.0
        }));
        let candidates = candidates.iter().map(Candidate::from_json).collect();
        ScoringJob::new(JobId::new("42"), target, candidates)
    }

    #[test]
    fn test_threshold_validation() {
        let scorer = Scorer::new(OutputMode::PerCandidate, 0.75).unwrap();
        assert_eq!(scorer.mode(), OutputMode::PerCandidate);
        assert_eq!(scorer.threshold(), 0.75);
        assert_eq!(Scorer::default().threshold(), DEFAULT_THRESHOLD);

        assert!(Scorer::new(OutputMode::Aggregate, 0.6).is_ok());
        assert!(Scorer::new(OutputMode::Aggregate, 1.5).is_err());
        assert!(Scorer::new(OutputMode::Aggregate, -0.1).is_err());
        assert!(Scorer::new(OutputMode::Aggregate, f64::NAN).is_err());
    }

    #[test]
    fn test_aggregate_exact_match_accepted() {
        let job = create_test_job(vec![json!({
            "book_id": "b1",
            "avg_word_len": 5.0,
            "lexical_diversity": 0.6,
            "conjunction_freq": 0.04,
            "avg_sentence_len": 15.0
        })]);
        let result = Scorer::default().run(&job).unwrap();

        assert_eq!(result.status(), JobStatus::Accepted);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": 4, "response": "100.00%"})
        );
    }

    #[test]
    fn test_aggregate_uses_mean() {
        let job = create_test_job(vec![
            json!({
                "book_id": "same",
                "avg_word_len": 5.0,
                "lexical_diversity": 0.6,
                "conjunction_freq": 0.04,
                "avg_sentence_len": 15.0
            }),
            // shares nothing with the target
            json!({"book_id": "empty"}),
        ]);
        let result = Scorer::default().run(&job).unwrap();

        match result {
            ScoreResult::Aggregate { status, response, probability } => {
                assert!((probability - 0.5).abs() < 1e-12);
                assert_eq!(status, JobStatus::Rejected);
                assert_eq!(response, "50.00%");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_threshold_configurable() {
        let job = create_test_job(vec![
            json!({
                "book_id": "same",
                "avg_word_len": 5.0,
                "lexical_diversity": 0.6,
                "conjunction_freq": 0.04,
                "avg_sentence_len": 15.0
            }),
            json!({"book_id": "empty"}),
        ]);
        let lenient = Scorer::new(OutputMode::Aggregate, 0.4).unwrap();
        assert_eq!(lenient.run(&job).unwrap().status(), JobStatus::Accepted);
    }

    #[test]
    fn test_aggregate_empty_candidates() {
        let job = create_test_job(vec![]);
        let result = Scorer::default().run(&job).unwrap();

        assert_eq!(result, ScoreResult::no_data());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": 5, "probability": 0.0})
        );
    }

    #[test]
    fn test_per_candidate_mode() {
        let job = create_test_job(vec![
            json!({
                "book_id": "b1",
                "avg_word_len": 5.0,
                "lexical_diversity": 0.6,
                "conjunction_freq": 0.04,
                "avg_sentence_len": 15.0
            }),
            json!({"book_id": 2}),
        ]);
        let scorer = Scorer::new(OutputMode::PerCandidate, DEFAULT_THRESHOLD).unwrap();
        let result = scorer.run(&job).unwrap();

        assert_eq!(result.status(), JobStatus::Pending);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": 3,
                "book_results": [
                    {"book_id": "b1", "similarity": 1.0},
                    {"book_id": 2, "similarity": 0.0}
                ]
            })
        );
    }

    #[test]
    fn test_per_candidate_empty_list() {
        let job = create_test_job(vec![]);
        let scorer = Scorer::new(OutputMode::PerCandidate, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(
            scorer.run(&job).unwrap(),
            ScoreResult::per_candidate(Vec::new())
        );
    }
}
