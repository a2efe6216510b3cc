//! Rate Limiter (Token Bucket Algorithm, one bucket per key)
//!
//! Keys are device ids (or the target endpoint for connect), so a flood of
//! requests against one device never throttles another.
//!
//! The number of tracked keys is capped. A bucket that has refilled to full
//! carries no state and is dropped when room is needed; once the cap is
//! reached anyway, new keys share a single overflow bucket.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::debug;

/// Default cap on tracked keys
const DEFAULT_MAX_KEYS: usize = 1024;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn full(max_tokens: u32, now: Instant) -> Self {
        Self {
            tokens: max_tokens as f64,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant, max_tokens: u32, refill_rate: u32) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate as f64).min(max_tokens as f64);
        self.last_refill = now;
    }

    fn take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct Buckets {
    by_key: HashMap<String, Bucket>,
    overflow: Bucket,
}

/// Keyed rate limiter
pub struct RateLimiter {
    buckets: Mutex<Buckets>,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
    max_keys: usize,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size per key
    /// * `refill_rate` - Tokens added per second per key
    ///
    /// # Example
    /// Allow 10 requests/sec per device with burst of 20:
    /// `RateLimiter::new(20, 10)`
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            buckets: Mutex::new(Buckets {
                by_key: HashMap::new(),
                overflow: Bucket::full(max_tokens, Instant::now()),
            }),
            max_tokens,
            refill_rate,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    /// Cap the number of individually tracked keys
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    /// Check if a request for `key` is allowed (consumes 1 token)
    ///
    /// Returns true if allowed, false if rate limited
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let buckets = &mut *guard;

        if !buckets.by_key.contains_key(key) && buckets.by_key.len() >= self.max_keys {
            self.evict_full(&mut buckets.by_key, now);
        }

        let bucket = if buckets.by_key.len() < self.max_keys || buckets.by_key.contains_key(key) {
            buckets
                .by_key
                .entry(key.to_string())
                .or_insert_with(|| Bucket::full(self.max_tokens, now))
        } else {
            &mut buckets.overflow
        };

        bucket.refill(now, self.max_tokens, self.refill_rate);
        bucket.take()
    }

    /// Drop buckets that have refilled to the burst size
    fn evict_full(&self, by_key: &mut HashMap<String, Bucket>, now: Instant) {
        let before = by_key.len();
        by_key.retain(|_, bucket| {
            bucket.refill(now, self.max_tokens, self.refill_rate);
            bucket.tokens < self.max_tokens as f64
        });
        debug!(evicted = before - by_key.len(), "Evicted idle rate-limit buckets");
    }

    /// Number of individually tracked keys (for monitoring)
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_key
            .len()
    }
}
