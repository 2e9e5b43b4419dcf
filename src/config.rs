use crate::error::ConfigError;
use crate::poll::PollPolicy;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Longer poll timeouts fall back to the default.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,

    /// Gemini model id (default: gemini-2.0-flash-exp)
    pub model: String,

    /// API root, overridable for tests and proxies
    pub base_url: String,

    pub bind_addr: SocketAddr,

    /// Largest accepted request body in bytes (default: 512 MB)
    pub max_upload_bytes: usize,

    /// Where scratch files go (default: system temp dir)
    pub scratch_dir: PathBuf,

    pub poll: PollPolicy,

    /// Offer the DuckDuckGo tool to the model (default: true)
    pub web_search: bool,

    pub search_max_results: usize,

    /// Function-call round trips allowed per request (default: 4)
    pub max_tool_rounds: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("GOOGLE_API_KEY"))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_addr = bind
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind.clone()))?;

        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let default_poll = PollPolicy::default();

        let poll = PollPolicy {
            initial_interval: parsed("POLL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(default_poll.initial_interval),
            max_interval: parsed("POLL_MAX_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(default_poll.max_interval),
            backoff_factor: lookup("POLL_BACKOFF")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|f| f.is_finite() && *f >= 1.0)
                .unwrap_or(default_poll.backoff_factor),
            max_attempts: parsed("POLL_MAX_ATTEMPTS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default_poll.max_attempts),
            timeout: parsed("POLL_TIMEOUT_SECS")
                .filter(|secs| *secs <= MAX_POLL_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(default_poll.timeout),
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr,
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(512 * 1024 * 1024),
            scratch_dir: lookup("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            poll,
            web_search: lookup("WEB_SEARCH_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            search_max_results: parsed("SEARCH_MAX_RESULTS")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(5),
            max_tool_rounds: parsed("MAX_TOOL_ROUNDS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(4),
        })
    }
}
