//! Stylometric feature vectors
//!
//! A feature vector holds exactly four named metrics. Values arrive as
//! loosely typed JSON and are coerced leniently: missing data counts as
//! zero and values that cannot be read as numbers are marked malformed
//! instead of failing the job.

use serde_json::Value;

/// The four metrics a feature vector is compared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AvgWordLen,
    LexicalDiversity,
    ConjunctionFreq,
    AvgSentenceLen,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::AvgWordLen,
        Metric::LexicalDiversity,
        Metric::ConjunctionFreq,
        Metric::AvgSentenceLen,
    ];

    /// JSON key the metric is read from
    pub fn key(&self) -> &'static str {
        match self {
            Metric::AvgWordLen => "avg_word_len",
            Metric::LexicalDiversity => "lexical_diversity",
            Metric::ConjunctionFreq => "conjunction_freq",
            Metric::AvgSentenceLen => "avg_sentence_len",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A single coerced metric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    /// Present but not readable as a finite number
    Malformed,
}

impl MetricValue {
    /// Coerce an optional JSON value.
    ///
    /// Absent, `null`, `false`, empty strings and empty containers are zero.
    /// Numbers and numeric strings are read as `f64`, `true` is one.
    /// Everything else is malformed.
    pub fn from_json(value: Option<&Value>) -> Self {
        let value = match value {
            None => return MetricValue::Value(0.0),
            Some(v) => v,
        };

        let parsed = match value {
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.is_empty() => Some(0.0),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Array(a) if a.is_empty() => Some(0.0),
            Value::Object(o) if o.is_empty() => Some(0.0),
            Value::Array(_) | Value::Object(_) => None,
        };

        match parsed {
            Some(v) if v.is_finite() => MetricValue::Value(v),
            _ => MetricValue::Malformed,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, MetricValue::Malformed)
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue::Value(0.0)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            MetricValue::Value(v)
        } else {
            MetricValue::Malformed
        }
    }
}

/// Fixed-size vector of the four stylometric metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    values: [MetricValue; 4],
}

impl FeatureVector {
    /// Create a vector from plain numbers, in `Metric::ALL` order
    pub fn new(values: [f64; 4]) -> Self {
        Self {
            values: values.map(MetricValue::from),
        }
    }

    /// Read the four metric keys from a JSON object.
    ///
    /// Unrecognized keys are ignored. A non-object value yields the zero vector.
    pub fn from_json(value: &Value) -> Self {
        let mut vector = Self::default();
        if let Value::Object(map) = value {
            for metric in Metric::ALL {
                vector.values[metric.index()] = MetricValue::from_json(map.get(metric.key()));
            }
        }
        vector
    }

    pub fn get(&self, metric: Metric) -> MetricValue {
        self.values[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.get(*m)))
    }
}

/// A candidate item scored against the target
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Opaque identifier, echoed back unchanged in per-candidate results
    pub book_id: Value,
    pub features: FeatureVector,
}

impl Candidate {
    pub fn new(book_id: Value, features: FeatureVector) -> Self {
        Self { book_id, features }
    }

    /// Build a candidate from one entry of the request's `books` array
    pub fn from_json(value: &Value) -> Self {
        let book_id = value.get("book_id").cloned().unwrap_or(Value::Null);
        Self {
            book_id,
            features: FeatureVector::from_json(value),
        }
    }
}
