//! Per-key cool-down for external searches.
//!
//! A key that triggered a search less than `cooldown` ago is throttled. The
//! limiter is a trait so the gateway can be driven by a fake clock in tests,
//! or backed by a shared store when several instances run side by side.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default cool-down between searches for the same key
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Default bound on tracked keys
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Decides whether an external search may run for a key.
pub trait RateLimiter: Send + Sync {
    /// True if the key was attempted within the cool-down window
    fn should_throttle(&self, key: &str) -> bool;

    /// Record that a search is starting for the key
    fn record_attempt(&self, key: &str);

    /// Drop the key's attempt, as if it had never been searched
    fn clear_attempt(&self, key: &str);
}

/// Process-local limiter with bounded memory.
///
/// When the map grows past `max_entries`, expired entries are swept; if it is
/// still too large, the oldest tenth of the map is evicted in one batch so
/// the next inserts don't trigger another sort.
pub struct InMemoryRateLimiter {
    attempts: Mutex<HashMap<String, Instant>>,
    cooldown: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new(cooldown: Duration, max_entries: usize) -> Self {
        Self::with_clock(cooldown, max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(cooldown: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            cooldown,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.attempts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.lock().is_empty()
    }

    fn evict(&self, attempts: &mut HashMap<String, Instant>, now: Instant) {
        let before = attempts.len();
        attempts.retain(|_, last| now.saturating_duration_since(*last) < self.cooldown);

        if attempts.len() > self.max_entries {
            let excess = attempts.len() - self.max_entries;
            let batch = excess.max(self.max_entries / 10).min(attempts.len());
            let mut by_age: Vec<(String, Instant)> =
                attempts.iter().map(|(k, t)| (k.clone(), *t)).collect();
            if batch < by_age.len() {
                by_age.select_nth_unstable_by_key(batch, |(_, t)| *t);
            }
            for (key, _) in by_age.into_iter().take(batch) {
                attempts.remove(&key);
            }
        }

        tracing::debug!(
            "Rate limiter evicted {} of {} keys",
            before - attempts.len(),
            before
        );
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_MAX_ENTRIES)
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn should_throttle(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.attempts
            .lock()
            .get(key)
            .is_some_and(|last| now.saturating_duration_since(*last) < self.cooldown)
    }

    fn record_attempt(&self, key: &str) {
        let now = self.clock.now();
        let mut attempts = self.attempts.lock();
        attempts.insert(key.to_string(), now);
        if attempts.len() > self.max_entries {
            self.evict(&mut attempts, now);
        }
    }

    fn clear_attempt(&self, key: &str) {
        self.attempts.lock().remove(key);
    }
}

/// Test clocks.
#[cfg(test)]
pub mod mocks {
    use super::*;

    /// Clock that only moves when told to.
    pub struct FakeClock {
        now: Mutex<Instant>,
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.now.lock() += by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::FakeClock;
    use super::*;

    fn limiter(max_entries: usize) -> (InMemoryRateLimiter, Arc<FakeClock>) {
        let clock = Arc::new(FakeClock::new());
        let limiter = InMemoryRateLimiter::with_clock(DEFAULT_COOLDOWN, max_entries, clock.clone());
        (limiter, clock)
    }

    #[test]
    fn test_unknown_key_not_throttled() {
        let (limiter, _) = limiter(10);
        assert!(!limiter.should_throttle("adele-hello"));
    }

    #[test]
    fn test_throttled_within_cooldown() {
        let (limiter, clock) = limiter(10);
        limiter.record_attempt("adele-hello");
        clock.advance(Duration::from_secs(59 * 60));
        assert!(limiter.should_throttle("adele-hello"));
        assert!(!limiter.should_throttle("adele-skyfall"));
    }

    #[test]
    fn test_released_after_cooldown() {
        let (limiter, clock) = limiter(10);
        limiter.record_attempt("adele-hello");
        clock.advance(DEFAULT_COOLDOWN);
        assert!(!limiter.should_throttle("adele-hello"));
    }

    #[test]
    fn test_record_overwrites_timestamp() {
        let (limiter, clock) = limiter(10);
        limiter.record_attempt("k");
        clock.advance(Duration::from_secs(50 * 60));
        limiter.record_attempt("k");
        clock.advance(Duration::from_secs(50 * 60));
        assert!(limiter.should_throttle("k"));
    }

    #[test]
    fn test_sweep_drops_expired_entries() {
        let (limiter, clock) = limiter(2);
        limiter.record_attempt("a");
        limiter.record_attempt("b");
        clock.advance(DEFAULT_COOLDOWN + Duration::from_secs(1));
        limiter.record_attempt("c");
        assert_eq!(limiter.len(), 1);
        assert!(limiter.should_throttle("c"));
    }

    #[test]
    fn test_evicts_oldest_when_all_live() {
        let (limiter, clock) = limiter(2);
        limiter.record_attempt("a");
        clock.advance(Duration::from_secs(1));
        limiter.record_attempt("b");
        clock.advance(Duration::from_secs(1));
        limiter.record_attempt("c");

        assert_eq!(limiter.len(), 2);
        assert!(!limiter.should_throttle("a"));
        assert!(limiter.should_throttle("b"));
        assert!(limiter.should_throttle("c"));
    }

    #[test]
    fn test_eviction_frees_a_batch() {
        let (limiter, clock) = limiter(100);
        for i in 0..100 {
            limiter.record_attempt(&format!("k{i}"));
            clock.advance(Duration::from_secs(1));
        }
        limiter.record_attempt("k100");

        // 101 live keys over a cap of 100: the oldest ten go at once
        assert_eq!(limiter.len(), 91);
        assert!(!limiter.should_throttle("k9"));
        assert!(limiter.should_throttle("k10"));
        assert!(limiter.should_throttle("k100"));

        for i in 101..110 {
            limiter.record_attempt(&format!("k{i}"));
        }
        assert_eq!(limiter.len(), 100);
        assert!(limiter.should_throttle("k10"));
    }

    #[test]
    fn test_clear_attempt() {
        let (limiter, _) = limiter(10);
        limiter.record_attempt("adele-hello");
        limiter.clear_attempt("adele-hello");
        assert!(!limiter.should_throttle("adele-hello"));
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let limiter = Arc::new(InMemoryRateLimiter::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let key = format!("{i}-{j}");
                        limiter.record_attempt(&key);
                        assert!(limiter.should_throttle(&key));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(limiter.len(), 800);
    }
}
