use crate::request::parse_scoring_request;
use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use bookmatch_core::WorkerPool;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Route accepting scoring requests
pub const START_ANALYSIS_PATH: &str = "/api/start_analysis";

/// Default request body limit, large enough for a few thousand candidates
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(pool: Arc<WorkerPool>, config: ApiConfig) -> std::io::Result<()> {
        let max_body_bytes = config.max_body_bytes;

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            let pool = pool.clone();
            App::new()
                .wrap(cors)
                .configure(|cfg| configure(cfg, pool, max_body_bytes))
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    }
}

/// Register the API routes and their shared state
pub fn configure(cfg: &mut web::ServiceConfig, pool: Arc<WorkerPool>, max_body_bytes: usize) {
    cfg.app_data(web::Data::from(pool))
        .app_data(json_config(max_body_bytes))
        .route(START_ANALYSIS_PATH, web::post().to(start_analysis))
        .route("/health", web::get().to(health));
}

/// Unreadable bodies are answered in the same `{"error": ...}` shape as validation failures
fn json_config(max_body_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_body_bytes)
        .content_type_required(false)
        .error_handler(|err, _req| {
            let body = serde_json::json!({ "error": err.to_string() });
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

async fn start_analysis(
    pool: web::Data<WorkerPool>,
    payload: web::Json<Value>,
) -> ActixResult<HttpResponse> {
    let job = match parse_scoring_request(&payload) {
        Ok(job) => job,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            })));
        }
    };

    let job_id = job.id.clone();
    let candidates = job.candidates.len();

    match pool.submit(job) {
        Ok(()) => {
            info!(job_id = %job_id, "Accepted scoring job with {} candidates", candidates);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "status": "Started"
            })))
        }
        Err(e) => {
            error!(job_id = %job_id, "Failed to submit scoring job: {}", e);
            Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

async fn health(pool: web::Data<WorkerPool>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "pool": pool.stats()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use bookmatch_core::{
        CallbackPayload, CompletionHandler, JobRunner, PoolConfig, Result, ScoreResult, ScoringJob,
    };
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingRunner {
        jobs: Mutex<Vec<ScoringJob>>,
    }

    impl JobRunner for CapturingRunner {
        fn run(&self, job: &ScoringJob) -> Result<ScoreResult> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(ScoreResult::no_data())
        }
    }

    struct NoopHandler;

    impl CompletionHandler for NoopHandler {
        async fn on_complete(&self, _payload: CallbackPayload) {}
    }

    fn start_pool(runner: Arc<CapturingRunner>) -> Arc<WorkerPool> {
        Arc::new(WorkerPool::start(PoolConfig::default(), runner, Arc::new(NoopHandler)).unwrap())
    }

    macro_rules! init_app {
        ($pool:expr) => {
            test::init_service(App::new().configure(|cfg| {
                configure(cfg, $pool.clone(), DEFAULT_MAX_BODY_BYTES)
            }))
            .await
        };
    }

    #[actix_web::test]
    async fn test_start_analysis_accepts_job() {
        let runner = Arc::new(CapturingRunner::default());
        let pool = start_pool(runner.clone());
        let app = init_app!(pool);

        let req = test::TestRequest::post()
            .uri(START_ANALYSIS_PATH)
            .set_json(json!({
                "id": "42",
                "avg_word_len": 5,
                "books": [{"book_id": "b1", "avg_word_len": 5}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "Started"}));

        pool.shutdown().await;
        let jobs = runner.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id.as_str(), "42");
        assert_eq!(jobs[0].candidates.len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_books_rejected() {
        let runner = Arc::new(CapturingRunner::default());
        let pool = start_pool(runner.clone());
        let app = init_app!(pool);

        let req = test::TestRequest::post()
            .uri(START_ANALYSIS_PATH)
            .set_json(json!({"id": "42"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Missing id or books"}));

        pool.shutdown().await;
        assert_eq!(pool.stats().submitted, 0);
        assert!(runner.jobs.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_missing_id_rejected() {
        let pool = start_pool(Arc::new(CapturingRunner::default()));
        let app = init_app!(pool);

        let req = test::TestRequest::post()
            .uri(START_ANALYSIS_PATH)
            .set_json(json!({"books": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(pool.stats().submitted, 0);
    }

    #[actix_web::test]
    async fn test_malformed_json_rejected() {
        let pool = start_pool(Arc::new(CapturingRunner::default()));
        let app = init_app!(pool);

        let req = test::TestRequest::post()
            .uri(START_ANALYSIS_PATH)
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"id\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body.get("error").is_some());
        assert_eq!(pool.stats().submitted, 0);
    }

    #[actix_web::test]
    async fn test_closed_pool_unavailable() {
        let pool = start_pool(Arc::new(CapturingRunner::default()));
        pool.shutdown().await;
        let app = init_app!(pool);

        let req = test::TestRequest::post()
            .uri(START_ANALYSIS_PATH)
            .set_json(json!({"id": "42", "books": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_health_reports_pool() {
        let pool = start_pool(Arc::new(CapturingRunner::default()));
        let app = init_app!(pool);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["pool"]["workers"], json!(2));
    }
}
