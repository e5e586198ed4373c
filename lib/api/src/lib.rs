pub mod request;
pub mod rest;

pub use request::parse_scoring_request;
pub use rest::{configure, ApiConfig, RestApi, DEFAULT_MAX_BODY_BYTES, START_ANALYSIS_PATH};
