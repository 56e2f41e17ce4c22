//! Fixed-window rate limiting over a pluggable counter store.
//!
//! The limiter never owns process-wide state; the store is injected through
//! `AppState` so deployments can back it with an external cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimitConfig;

/// Counter state for one key after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHit {
    /// Hits in the current window, including this one.
    pub count: u64,
    /// Time until the window resets.
    pub reset_after: Duration,
}

/// Storage for per-key hit counters that expire after a window.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one hit for `key`, starting a new window if the previous expired.
    async fn increment(&self, key: &str, window: Duration) -> RateLimitHit;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    window_start: Instant,
    window: Duration,
    hits: u64,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.window_start) >= self.window
    }
}

#[derive(Debug)]
struct MemoryState {
    entries: HashMap<String, Entry>,
    last_cleanup: Instant,
}

/// In-process store, suitable for a single instance.
#[derive(Debug)]
pub struct MemoryRateLimitStore {
    state: Mutex<MemoryState>,
    cleanup_interval: Duration,
}

impl MemoryRateLimitStore {
    pub fn new(cleanup_interval: Duration) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                entries: HashMap::new(),
                last_cleanup: Instant::now(),
            }),
            cleanup_interval,
        }
    }

    /// Number of tracked keys.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn increment(&self, key: &str, window: Duration) -> RateLimitHit {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        if now.duration_since(state.last_cleanup) >= self.cleanup_interval {
            state.entries.retain(|_, entry| !entry.expired(now));
            state.last_cleanup = now;
        }

        let entry = state
            .entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.expired(now) {
                    *entry = Entry {
                        window_start: now,
                        window,
                        hits: 0,
                    };
                }
            })
            .or_insert(Entry {
                window_start: now,
                window,
                hits: 0,
            });

        entry.hits = entry.hits.saturating_add(1);

        RateLimitHit {
            count: entry.hits,
            reset_after: entry
                .window
                .saturating_sub(now.duration_since(entry.window_start)),
        }
    }
}

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_after_secs: u64,
}

/// Applies a [`RateLimitConfig`] to a store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let hit = self.store.increment(key, self.config.window).await;
        let reset_after_secs = hit.reset_after.as_secs_f64().ceil() as u64;
        RateLimitDecision {
            allowed: hit.count <= self.config.max,
            limit: self.config.max,
            remaining: self.config.max.saturating_sub(hit.count),
            reset_after_secs,
        }
    }
}
