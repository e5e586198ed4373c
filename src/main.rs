use bookmatch_api::{ApiConfig, RestApi, DEFAULT_MAX_BODY_BYTES};
use bookmatch_callback::{CallbackConfig, CallbackDispatcher};
use bookmatch_core::{OutputMode, PoolConfig, WorkerPool};
use bookmatch_similarity::{Scorer, DEFAULT_THRESHOLD};
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputModeArg {
    /// Mean similarity with an accept/reject decision
    Aggregate,
    /// Similarity of every candidate, decision left to the receiver
    PerCandidate,
}

impl From<OutputModeArg> for OutputMode {
    fn from(arg: OutputModeArg) -> Self {
        match arg {
            OutputModeArg::Aggregate => OutputMode::Aggregate,
            OutputModeArg::PerCandidate => OutputMode::PerCandidate,
        }
    }
}

/// Asynchronous book similarity scoring with HTTP callbacks
#[derive(Parser, Debug)]
#[command(name = "bookmatch")]
#[command(about = "Scores books against a target style and reports back asynchronously", long_about = None)]
struct Args {
    /// Address the HTTP API binds to
    #[arg(long, env = "BOOKMATCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "BOOKMATCH_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Base URL results are sent to; the job id is appended
    #[arg(
        long,
        env = "BOOKMATCH_CALLBACK_URL",
        default_value = "http://localhost:8090/api/analysebookscalc/"
    )]
    callback_url: String,

    /// Shared secret sent in the X-Secret-Key header
    #[arg(long, env = "BOOKMATCH_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Number of jobs scored concurrently
    #[arg(long, env = "BOOKMATCH_WORKERS", default_value_t = 2)]
    workers: usize,

    /// Artificial delay before each job is scored, in milliseconds
    #[arg(long, env = "BOOKMATCH_PROCESSING_DELAY_MS", default_value_t = 10_000)]
    processing_delay_ms: u64,

    /// Mean similarity a job must exceed to be accepted (aggregate mode)
    #[arg(long, env = "BOOKMATCH_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Shape of the callback body
    #[arg(long, env = "BOOKMATCH_OUTPUT_MODE", value_enum, default_value_t = OutputModeArg::Aggregate)]
    output_mode: OutputModeArg,

    /// Callback request timeout, in seconds
    #[arg(long, env = "BOOKMATCH_CALLBACK_TIMEOUT_SECS", default_value_t = 30)]
    callback_timeout_secs: u64,

    /// Maximum accepted request body size, in bytes
    #[arg(long, env = "BOOKMATCH_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Log level
    #[arg(long, env = "BOOKMATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting bookmatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Callback URL: {}", args.callback_url);
    let scorer = Arc::new(Scorer::new(args.output_mode.into(), args.threshold)?);
    info!("Output mode: {:?}, threshold: {}", scorer.mode(), scorer.threshold());

    let dispatcher = Arc::new(CallbackDispatcher::new(CallbackConfig {
        base_url: args.callback_url.clone(),
        secret_key: args.secret_key.clone(),
        timeout: Duration::from_secs(args.callback_timeout_secs),
    })?);
    let pool = Arc::new(WorkerPool::start(
        PoolConfig {
            workers: args.workers,
            processing_delay: Duration::from_millis(args.processing_delay_ms),
        },
        scorer,
        dispatcher,
    )?);

    let api_config = ApiConfig {
        host: args.host.clone(),
        port: args.http_port,
        max_body_bytes: args.max_body_bytes,
    };
    let pool_http = pool.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", api_config.host, api_config.port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(pool_http, api_config).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("bookmatch started successfully");
    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down, {} jobs still queued...", pool.pending_jobs());
    pool.shutdown().await;
    Ok(())
}
