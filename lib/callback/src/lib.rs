//! # bookmatch Callback
//!
//! Best-effort delivery of finished scoring jobs to the service that
//! requested them. Each result is `PUT` to `<base_url>/<job_id>` with a
//! shared-secret header. Failures are logged and never retried.

pub mod dispatcher;
pub mod error;

pub use dispatcher::{CallbackConfig, CallbackDispatcher, SECRET_HEADER};
pub use error::CallbackError;
