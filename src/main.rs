use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kew::config::Config;
use kew::fetcher::HttpArticleFetcher;
use kew::handlers::AppState;
use kew::keywords::KeywordExtractor;
use kew::language::WhatlangDetector;
use kew::pipeline::Pipeline;
use kew::rate_limiter::RateLimiter;
use kew::server;
use kew::store::{MemoryStore, RedisStore, SlidingWindowStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::parse();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kew={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kew service");
    tracing::info!(
        "Configuration: bind_addr={}, max_requests={}, window_seconds={}",
        config.bind_addr,
        config.max_requests,
        config.window_seconds
    );

    let store: Arc<dyn SlidingWindowStore> = if config.memory_store {
        tracing::info!("Using in-process rate limit store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Connecting to rate limit store at {}", config.redis_url);
        Arc::new(
            RedisStore::connect(
                &config.redis_url,
                Duration::from_millis(config.store_timeout_ms),
            )
            .await
            .map_err(|e| anyhow::anyhow!("failed to connect to rate limit store: {e}"))?,
        )
    };

    let rate_limiter = RateLimiter::new(store, config.max_requests, config.window_seconds);

    // Collaborators are built once and reused across requests.
    let fetcher = HttpArticleFetcher::new(Duration::from_millis(config.fetch_timeout_ms))
        .map_err(|e| anyhow::anyhow!("failed to build article fetcher: {e}"))?;
    let pipeline = Pipeline::new(
        rate_limiter,
        Arc::new(fetcher),
        Arc::new(WhatlangDetector),
        KeywordExtractor::new(config.salience_threshold),
    );

    let state = Arc::new(AppState { pipeline });

    server::run(&config, state)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}
