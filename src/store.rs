//! Rate limit store clients.
//!
//! The sliding window lives in a key-ordered counter store shared by every
//! process replica. `RedisStore` is the production client; `MemoryStore` is
//! the in-process variant selected by `--memory-store` and used by tests.

use crate::error::{ExtractorError, Result};
use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use redis::Script;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time;
use uuid::Uuid;

/// One indivisible step against the store: evict entries at or below
/// `now_ms - window_secs * 1000`, count the remainder, record `now_ms`, and
/// refresh the key TTL to `window_secs`. Returns the count taken before the
/// insert. Concurrent calls for the same key must be linearized by the
/// implementation; two callers reading the same stale count would both be
/// admitted past the bound.
#[async_trait]
pub trait SlidingWindowStore: Send + Sync {
    async fn trim_count_insert_expire(&self, key: &str, now_ms: u64, window_secs: u64)
        -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

/// All four steps run server-side in one script, so Redis serializes
/// competing admission checks for a key. Members carry a unique suffix:
/// with bare timestamps as members, two admissions in the same millisecond
/// would collapse into one sorted set entry and widen the limit.
const SLIDING_WINDOW_SCRIPT: &str = r"
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', ARGV[1])
local count = redis.call('ZCARD', KEYS[1])
redis.call('ZADD', KEYS[1], ARGV[2], ARGV[3])
redis.call('EXPIRE', KEYS[1], ARGV[4])
return count
";

/// Pooled Redis client for the sliding window. A connection is checked out
/// for exactly one round trip and returned when the guard drops, including on
/// error paths.
pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
    script: Script,
    op_timeout: Duration,
}

impl RedisStore {
    /// Builds the pool and verifies the store is reachable before the server
    /// starts taking requests.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> Result<Self> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|e| ExtractorError::Store(format!("invalid redis url: {e}")))?;

        let pool = Pool::builder()
            .max_size(16)
            .connection_timeout(op_timeout)
            .build(manager)
            .await
            .map_err(|e| ExtractorError::Store(format!("failed to build redis pool: {e}")))?;

        let store = Self {
            pool,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            op_timeout,
        };
        store.ping().await?;

        Ok(store)
    }
}

#[async_trait]
impl SlidingWindowStore for RedisStore {
    async fn trim_count_insert_expire(
        &self,
        key: &str,
        now_ms: u64,
        window_secs: u64,
    ) -> Result<u64> {
        let cutoff = now_ms.saturating_sub(window_secs.saturating_mul(1000));
        let member = format!("{}-{}", now_ms, Uuid::new_v4());

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ExtractorError::Store(e.to_string()))?;

        let mut invocation = self.script.key(key);
        invocation.arg(cutoff).arg(now_ms).arg(&member).arg(window_secs);

        let count = time::timeout(self.op_timeout, invocation.invoke_async::<_, u64>(&mut *conn))
            .await
            .map_err(|_| ExtractorError::Store("store operation timed out".to_string()))?
            .map_err(|e| ExtractorError::Store(e.to_string()))?;

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ExtractorError::Store(e.to_string()))?;

        let reply = time::timeout(
            self.op_timeout,
            redis::cmd("PING").query_async::<_, String>(&mut *conn),
        )
        .await
        .map_err(|_| ExtractorError::Store("store operation timed out".to_string()))?
        .map_err(|e| ExtractorError::Store(e.to_string()))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(ExtractorError::Store(format!("unexpected ping reply: {reply}")))
        }
    }
}

/// In-process store. The mutex makes the trim/count/insert sequence
/// indivisible; expiry falls out of trimming on access, so there is no
/// background reaper.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlidingWindowStore for MemoryStore {
    async fn trim_count_insert_expire(
        &self,
        key: &str,
        now_ms: u64,
        window_secs: u64,
    ) -> Result<u64> {
        let cutoff = now_ms.saturating_sub(window_secs.saturating_mul(1000));

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ExtractorError::Internal("store mutex poisoned".to_string()))?;

        let stamps = entries.entry(key.to_string()).or_default();
        stamps.retain(|&t| t > cutoff);
        let count = stamps.len() as u64;
        stamps.push(now_ms);

        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
