use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Where login attempts are counted.
///
/// [`RateLimiter`] keeps its windows in process memory, so each instance of
/// a horizontally scaled deployment would grant its own budget. Such a
/// deployment shares one implementation backed by shared storage across
/// all instances instead.
#[async_trait]
pub trait LoginLimiter: Send + Sync {
    /// Consume one attempt for `key`.
    async fn check(&self, key: &str) -> RateDecision;

    /// Drop windows that have fully elapsed. Returns how many were removed.
    async fn cleanup(&self) -> usize;
}

/// Fixed-window attempt counter keyed by an arbitrary string
/// (e.g. `"login:203.0.113.7"`).
///
/// The window for a key opens on its first attempt and resets once it has
/// fully elapsed. Check-and-increment happens under one lock, so parallel
/// attempts for the same key are counted exactly.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

#[derive(Debug)]
struct RateLimiterInner {
    windows: Mutex<HashMap<String, Window>>,
    /// Attempts allowed per window
    max_attempts: u32,
    window: Duration,
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    attempts: u32,
}

/// Outcome of consuming one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }

    /// Whole seconds until the window reopens, never less than 1 when
    /// limited. `None` when allowed.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            RateDecision::Allowed { .. } => None,
            RateDecision::Limited { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
        }
    }
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_attempts` - Attempts allowed per key within one window
    /// * `window` - Length of the window
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                windows: Mutex::new(HashMap::new()),
                max_attempts,
                window,
            }),
        }
    }

    /// Consume one attempt for `key` as of `now`.
    ///
    /// Attempts made while limited are not counted; they neither extend the
    /// window nor add to the next one.
    pub async fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut windows = self.inner.windows.lock().await;

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            attempts: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.inner.window {
            *entry = Window {
                started: now,
                attempts: 0,
            };
        }

        if entry.attempts >= self.inner.max_attempts {
            let elapsed = now.saturating_duration_since(entry.started);
            return RateDecision::Limited {
                retry_after: self.inner.window.saturating_sub(elapsed),
            };
        }

        entry.attempts += 1;
        RateDecision::Allowed {
            remaining: self.inner.max_attempts - entry.attempts,
        }
    }

    pub async fn cleanup_at(&self, now: Instant) -> usize {
        let mut windows = self.inner.windows.lock().await;
        let before = windows.len();

        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.inner.window);

        before - windows.len()
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.inner.windows.lock().await.len()
    }
}

#[async_trait]
impl LoginLimiter for RateLimiter {
    async fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now()).await
    }

    async fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now()).await
    }
}
