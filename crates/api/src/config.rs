use std::time::Duration;

use adlens_gateway::{GatewayConfig, RetryPolicy};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the external analysis provider.
    pub provider_url: String,
    /// Per-attempt deadline for provider calls, in seconds (default: `30`).
    pub analysis_timeout_secs: u64,
    /// Retries after the first provider attempt (default: `2`).
    pub analysis_max_retries: u32,
    /// Cap on concurrent outstanding provider calls (default: `4`).
    pub analysis_max_concurrency: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `PROVIDER_URL`             | `http://localhost:8200` |
    /// | `ANALYSIS_TIMEOUT_SECS`    | `30`                    |
    /// | `ANALYSIS_MAX_RETRIES`     | `2`                     |
    /// | `ANALYSIS_MAX_CONCURRENCY` | `4`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let provider_url =
            std::env::var("PROVIDER_URL").unwrap_or_else(|_| "http://localhost:8200".into());

        let analysis_timeout_secs: u64 = std::env::var("ANALYSIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("ANALYSIS_TIMEOUT_SECS must be a valid u64");

        let analysis_max_retries: u32 = std::env::var("ANALYSIS_MAX_RETRIES")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("ANALYSIS_MAX_RETRIES must be a valid u32");

        let analysis_max_concurrency: usize = std::env::var("ANALYSIS_MAX_CONCURRENCY")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("ANALYSIS_MAX_CONCURRENCY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            provider_url,
            analysis_timeout_secs,
            analysis_max_retries,
            analysis_max_concurrency,
        }
    }

    /// Gateway parameters derived from this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            attempt_timeout: Duration::from_secs(self.analysis_timeout_secs),
            max_concurrency: self.analysis_max_concurrency,
            retry: RetryPolicy {
                max_retries: self.analysis_max_retries,
                ..RetryPolicy::default()
            },
        }
    }
}
