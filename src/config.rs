use clap::Parser;
use std::net::SocketAddr;

/// Process-level configuration, resolved once at startup. Every flag can also
/// come from the environment (a `.env` file is loaded before parsing).
#[derive(Parser, Debug, Clone)]
#[command(name = "kew", about = "Keyword extraction web service with sliding window rate limiting")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "KEW_BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    /// Redis connection URL for the rate limit store
    #[arg(long, env = "KEW_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Use the in-process store instead of an external Redis instance
    #[arg(long, env = "KEW_MEMORY_STORE")]
    pub memory_store: bool,

    /// Admissions allowed per client within one rolling window
    #[arg(long, env = "KEW_RATE_LIMIT_MAX_REQUESTS", default_value_t = 6)]
    pub max_requests: u32,

    /// Sliding window length in seconds, also the store key TTL
    #[arg(long, env = "KEW_RATE_LIMIT_WINDOW_SECONDS", default_value_t = 60)]
    pub window_seconds: u64,

    /// Article fetch timeout in milliseconds
    #[arg(long, env = "KEW_FETCH_TIMEOUT_MS", default_value_t = 1000)]
    pub fetch_timeout_ms: u64,

    /// Rate limit store operation timeout in milliseconds
    #[arg(long, env = "KEW_STORE_TIMEOUT_MS", default_value_t = 500)]
    pub store_timeout_ms: u64,

    /// Minimum normalized weight for a keyword to be returned
    #[arg(long, env = "KEW_SALIENCE_THRESHOLD", default_value_t = 0.25)]
    pub salience_threshold: f64,

    /// Log level for the kew target
    #[arg(long, env = "KEW_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Rejects settings that would make the limiter or the collaborators
    /// misbehave silently.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_requests == 0 {
            return Err("max_requests must be greater than 0".to_string());
        }
        if self.window_seconds == 0 {
            return Err("window_seconds must be greater than 0".to_string());
        }
        if self.fetch_timeout_ms == 0 || self.store_timeout_ms == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.salience_threshold) {
            return Err("salience_threshold must be within 0.0..=1.0".to_string());
        }
        if !self.memory_store
            && !self.redis_url.starts_with("redis://")
            && !self.redis_url.starts_with("rediss://")
        {
            return Err("redis_url must start with 'redis://' or 'rediss://'".to_string());
        }
        Ok(())
    }
}
