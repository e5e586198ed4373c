use crate::error::CallbackError;
use bookmatch_core::{CallbackPayload, CompletionHandler, JobId};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{info, warn};

/// Header carrying the shared secret expected by the receiving service
pub const SECRET_HEADER: &str = "X-Secret-Key";

#[derive(Debug, Clone)]
pub struct CallbackConfig {
    /// Job ids are appended to this URL as a final path segment
    pub base_url: String,
    pub secret_key: String,
    pub timeout: Duration,
}

/// Delivers finished jobs to the calling service
///
/// Delivery is at-most-once: failures are logged and dropped, never retried.
#[derive(Debug, Clone)]
pub struct CallbackDispatcher {
    client: reqwest::Client,
    base_url: Url,
    secret_key: HeaderValue,
}

impl CallbackDispatcher {
    pub fn new(config: CallbackConfig) -> Result<Self, CallbackError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CallbackError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CallbackError::InvalidUrl(config.base_url));
        }

        let mut secret_key =
            HeaderValue::from_str(&config.secret_key).map_err(|_| CallbackError::InvalidSecret)?;
        secret_key.set_sensitive(true);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            secret_key,
        })
    }

    /// `<base_url>/<job_id>`, with the id percent-encoded as one segment
    ///
    /// Ids that cannot form their own segment (`""`, `"."`, `".."`) are refused.
    pub fn callback_url(&self, job_id: &JobId) -> Result<Url, CallbackError> {
        if matches!(job_id.as_str(), "" | "." | "..") {
            return Err(CallbackError::InvalidUrl(format!(
                "job id {:?} is not a usable path segment",
                job_id.as_str()
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CallbackError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(job_id.as_str());
        Ok(url)
    }

    /// PUT the job's result to its callback URL
    ///
    /// Only the response status is observed; the body is never read.
    pub async fn deliver(&self, payload: &CallbackPayload) -> Result<StatusCode, CallbackError> {
        let url = self.callback_url(&payload.job_id)?;
        let body = serde_json::to_vec(&payload.result)?;

        let response = self
            .client
            .put(url)
            .header(SECRET_HEADER, self.secret_key.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallbackError::Status(status));
        }
        Ok(status)
    }
}

impl CompletionHandler for CallbackDispatcher {
    async fn on_complete(&self, payload: CallbackPayload) {
        match self.deliver(&payload).await {
            Ok(status) => info!(
                job_id = %payload.job_id,
                status = payload.status_code(),
                "Sent callback: {}",
                status
            ),
            Err(e) => warn!(
                job_id = %payload.job_id,
                status = payload.status_code(),
                "Callback error: {}",
                e
            ),
        }
    }
}
