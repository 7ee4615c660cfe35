//! Per-key fixed-window rate limiting.
//!
//! State is ephemeral by design: counters only throttle, they are not
//! safety-critical, so losing them on restart is acceptable.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default window length: one minute
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by API key.
///
/// Counters live in a concurrent map; each `allow` call holds only the
/// entry for its own key, so independent keys never contend. The
/// expired-window reset and the increment happen under the same entry
/// guard, which rules out lost increments and double resets.
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    counters: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    /// Limiter with the standard one-minute window
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_window(limit_per_minute, WINDOW)
    }

    /// Limiter with an explicit window length (tests use short windows)
    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            counters: DashMap::new(),
        }
    }

    /// Returns true if the request is allowed; false if rate-limited.
    ///
    /// A missing window, or one whose start is at least a full window in
    /// the past, is (re)started as part of this same call.
    pub fn allow(&self, key: &str) -> bool {
        let mut window = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: Instant::now(),
                count: 0,
            });

        if window.started.elapsed() >= self.window {
            window.started = Instant::now();
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.limit
    }

    /// Configured per-window request limit
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length in whole seconds (the retry-after hint)
    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_limit_boundary() {
        let limiter = FixedWindowLimiter::new(5);

        for i in 0..5 {
            assert!(limiter.allow("key-a"), "call {i} should be allowed");
        }
        assert!(!limiter.allow("key-a"), "call 6 should be denied");
        assert!(!limiter.allow("key-a"), "further calls stay denied");
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(2);

        assert!(limiter.allow("key-a"));
        assert!(limiter.allow("key-a"));
        assert!(!limiter.allow("key-a"));

        // Exhausting key-a leaves key-b's budget untouched
        assert!(limiter.allow("key-b"));
        assert!(limiter.allow("key-b"));
    }

    #[test]
    fn test_window_reset_readmits() {
        let limiter = FixedWindowLimiter::with_window(2, Duration::from_millis(50));

        assert!(limiter.allow("key-a"));
        assert!(limiter.allow("key-a"));
        assert!(!limiter.allow("key-a"));

        std::thread::sleep(Duration::from_millis(60));

        assert!(limiter.allow("key-a"), "new window should readmit");
    }

    #[test]
    fn test_zero_limit_clamped_to_one() {
        let limiter = FixedWindowLimiter::new(0);
        assert_eq!(limiter.limit(), 1);
        assert!(limiter.allow("key-a"));
        assert!(!limiter.allow("key-a"));
    }

    #[test]
    fn test_no_lost_increments_under_concurrency() {
        let limiter = Arc::new(FixedWindowLimiter::new(100));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || {
                let mut allowed = 0u32;
                for _ in 0..50 {
                    if limiter.allow("shared-key") {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let allowed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 400 calls against a budget of 100: exactly the limit is admitted
        assert_eq!(allowed, 100);
    }
}
