//! # bookmatch Similarity
//!
//! Canberra-style similarity over stylometric feature vectors, and the
//! job runner that turns a scoring job into a callback result.
//!
//! ## Example
//!
//! ```rust
//! use bookmatch_core::FeatureVector;
//! use bookmatch_similarity::canberra_similarity;
//!
//! let target = FeatureVector::new([5.0, 0.6, 0.04, 15.0]);
//! let candidate = FeatureVector::new([5.0, 0.6, 0.04, 45.0]);
//! // one metric differs by |15 - 45| / 60 = 0.5, over four metrics
//! assert_eq!(canberra_similarity(&target, &candidate), 0.875);
//! ```

pub mod distance;
pub mod scorer;

pub use distance::{canberra_distance, canberra_similarity, metric_term};
pub use scorer::{Scorer, DEFAULT_THRESHOLD};
