use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::client_key::ClientKey;
use crate::error::Result;
use crate::store::SlidingWindowStore;

/// Wall clock in milliseconds since the epoch, recorded at admission-check
/// time.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Per-client sliding window admission control on top of the shared store.
/// The window is recomputed relative to `now` on every call, not a fixed
/// bucket.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn SlidingWindowStore>,
    max_requests: u32,
    window_seconds: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn SlidingWindowStore>, max_requests: u32, window_seconds: u64) -> Self {
        Self {
            store,
            max_requests,
            window_seconds,
        }
    }

    /// One atomic store round trip: evict, count, record, refresh TTL.
    /// Admission is decided on the count taken before this call's timestamp
    /// is inserted, so a client gets exactly `max_requests` admissions per
    /// rolling window. A rejected attempt's timestamp is still recorded.
    pub async fn check_and_record(&self, client: &ClientKey, now_ms: u64) -> Result<bool> {
        let key = format!("kew:rate:{client}");
        let before = self
            .store
            .trim_count_insert_expire(&key, now_ms, self.window_seconds)
            .await?;

        Ok(before < u64::from(self.max_requests))
    }

    pub async fn store_available(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
