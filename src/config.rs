//! Environment-driven startup configuration, validated once at boot per the
//! lifecycle controller's startup order (reject early rather than fail
//! later on first use).

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub node_env: String,

    pub require_auth: bool,
    pub api_key: Option<String>,
    pub allowed_origins: AllowedOrigins,

    pub redis_enabled: bool,
    pub redis_url: Option<String>,
    pub redis_password: Option<String>,

    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u64,
    pub rate_limit_bypass: bool,

    pub min_workers: usize,
    pub max_workers: usize,
    pub max_queue_size: usize,
    pub max_tasks_per_worker: u32,
    pub worker_idle: Duration,
    pub task_buffer: Duration,

    pub ytdlp_timeout: Duration,
    pub ytdlp_max_buffer: usize,
    pub ytdlp_path: String,

    pub circuit_failure_threshold: usize,
    pub circuit_volume_threshold: usize,
    pub circuit_wait_duration_in_open: Duration,
    pub circuit_success_threshold: u32,

    pub max_retries: u32,

    pub shutdown_grace: Duration,
}

#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {kind}, got {value:?}")]
    Invalid { var: &'static str, kind: &'static str, value: String },
    #[error("REQUIRE_AUTH is true but API_KEY is missing or shorter than 16 characters")]
    WeakApiKey,
    #[error("REDIS_ENABLED is true but REDIS_URL is missing")]
    MissingRedisUrl,
    #[error("MIN_WORKERS ({min}) must be <= MAX_WORKERS ({max})")]
    WorkerBoundsInverted { min: usize, max: usize },
}

impl AppConfig {
    /// Loads and validates configuration from the process environment.
    /// Fails fast: every variable is parsed and cross-checked before
    /// returning, so a misconfiguration surfaces at startup, not mid-run.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_env_or("PORT", 8080u16)?;
        let node_env = std::env::var("NODE_ENV").unwrap_or_else(|_| "dev".to_string());

        let require_auth = parse_env_or("REQUIRE_AUTH", false)?;
        let api_key = std::env::var("API_KEY").ok();
        if require_auth && api_key.as_deref().map(str::len).unwrap_or(0) < 16 {
            return Err(ConfigError::WeakApiKey);
        }

        let allowed_origins = match std::env::var("ALLOWED_ORIGINS") {
            Ok(value) if value.trim() == "*" => AllowedOrigins::Any,
            Ok(value) => AllowedOrigins::List(value.split(',').map(|s| s.trim().to_string()).collect()),
            Err(_) => AllowedOrigins::Any,
        };

        let redis_enabled = parse_env_or("REDIS_ENABLED", false)?;
        let redis_url = std::env::var("REDIS_URL").ok();
        let redis_password = std::env::var("REDIS_PASSWORD").ok();
        if redis_enabled && redis_url.is_none() {
            return Err(ConfigError::MissingRedisUrl);
        }

        let rate_limit_window_ms: u64 = parse_env_or("RATE_LIMIT_WINDOW_MS", 60_000)?;
        let rate_limit_max_requests = parse_env_or("RATE_LIMIT_MAX_REQUESTS", 60u64)?;
        let rate_limit_bypass = parse_env_or("RATE_LIMIT_BYPASS", false)?;

        let min_workers = parse_env_or("MIN_WORKERS", 1usize)?;
        let max_workers = parse_env_or("MAX_WORKERS", 4usize)?;
        if min_workers > max_workers {
            return Err(ConfigError::WorkerBoundsInverted { min: min_workers, max: max_workers });
        }
        let max_queue_size = parse_env_or("MAX_QUEUE_SIZE", 50usize)?;
        let max_tasks_per_worker = parse_env_or("MAX_TASKS_PER_WORKER", 100u32)?;
        let worker_idle_ms: u64 = parse_env_or("WORKER_IDLE_MS", 60_000)?;
        let task_buffer_ms: u64 = parse_env_or("TASK_BUFFER_MS", 5_000)?;

        let ytdlp_timeout_ms: u64 = parse_env_or("YTDLP_TIMEOUT", 30_000)?;
        let ytdlp_max_buffer = parse_env_or("YTDLP_MAX_BUFFER", 10 * 1024 * 1024usize)?;
        let ytdlp_path = std::env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string());

        let circuit_failure_threshold = parse_env_or("CIRCUIT_FAILURE_THRESHOLD", 5usize)?;
        let circuit_volume_threshold = parse_env_or("CIRCUIT_VOLUME_THRESHOLD", 10usize)?;
        let circuit_wait_duration_ms: u64 = parse_env_or("CIRCUIT_WAIT_DURATION_MS", 60_000)?;
        let circuit_success_threshold = parse_env_or("CIRCUIT_SUCCESS_THRESHOLD", 2u32)?;

        let max_retries = parse_env_or("MAX_RETRIES", 2u32)?;

        let shutdown_grace_ms: u64 = parse_env_or("SHUTDOWN_GRACE_MS", 30_000)?;

        Ok(Self {
            port,
            node_env,
            require_auth,
            api_key,
            allowed_origins,
            redis_enabled,
            redis_url,
            redis_password,
            rate_limit_window: Duration::from_millis(rate_limit_window_ms),
            rate_limit_max_requests,
            rate_limit_bypass,
            min_workers,
            max_workers,
            max_queue_size,
            max_tasks_per_worker,
            worker_idle: Duration::from_millis(worker_idle_ms),
            task_buffer: Duration::from_millis(task_buffer_ms),
            ytdlp_timeout: Duration::from_millis(ytdlp_timeout_ms),
            ytdlp_max_buffer,
            ytdlp_path,
            circuit_failure_threshold,
            circuit_volume_threshold,
            circuit_wait_duration_in_open: Duration::from_millis(circuit_wait_duration_ms),
            circuit_success_threshold,
            max_retries,
            shutdown_grace: Duration::from_millis(shutdown_grace_ms),
        })
    }
}

fn parse_env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            var,
            kind: std::any::type_name::<T>(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
