//! Process-wide token bucket.
//!
//! The bucket is constructed once by the composition root and shared via
//! `Arc`. Refill is lazy: every acquisition first credits the tokens earned
//! since the previous call, then tries to take one.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::RateLimitConfig;

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, now: Instant, capacity: f64, interval: Duration) {
        // Instant::saturating_duration_since clamps a backwards clock to zero.
        let elapsed = now.saturating_duration_since(self.last_refill);
        let earned = capacity * elapsed.as_secs_f64() / interval.as_secs_f64();
        self.tokens = (self.tokens + earned).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }
}

/// A token bucket with fixed capacity and refill interval.
pub struct TokenBucket {
    capacity: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

/// Point-in-time view of the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketSnapshot {
    pub capacity: u32,
    pub available: f64,
}

impl TokenBucket {
    /// Create a full bucket holding `capacity` tokens that refills
    /// completely over `refill_interval`.
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self::new_at(capacity, refill_interval, Instant::now())
    }

    /// Like [`TokenBucket::new`] with an explicit creation instant.
    pub fn new_at(capacity: u32, refill_interval: Duration, now: Instant) -> Self {
        Self {
            capacity,
            refill_interval: refill_interval.max(Duration::from_millis(1)),
            state: Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: now,
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, Duration::from_millis(config.refill_interval_ms))
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Take one token.
    ///
    /// Returns the whole tokens left after the attempt. A negative value
    /// means the request was denied; a denial leaves the bucket untouched.
    pub fn try_acquire(&self) -> i64 {
        self.try_acquire_at(Instant::now())
    }

    /// [`TokenBucket::try_acquire`] evaluated at `now`.
    pub fn try_acquire_at(&self, now: Instant) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refill(now, self.capacity as f64, self.refill_interval);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            state.tokens.floor() as i64
        } else {
            (state.tokens - 1.0).floor() as i64
        }
    }

    /// Tokens currently available, including any refill owed, without
    /// consuming anything.
    pub fn available(&self) -> f64 {
        self.available_at(Instant::now())
    }

    pub fn available_at(&self, now: Instant) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refill(now, self.capacity as f64, self.refill_interval);
        state.tokens
    }

    pub fn snapshot(&self) -> BucketSnapshot {
        BucketSnapshot {
            capacity: self.capacity,
            available: self.available(),
        }
    }
}

impl std::fmt::Debug for TokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucket")
            .field("capacity", &self.capacity)
            .field("refill_interval", &self.refill_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_starts_full_and_counts_down() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(3, MINUTE, start);

        assert_eq!(bucket.try_acquire_at(start), 2);
        assert_eq!(bucket.try_acquire_at(start), 1);
        assert_eq!(bucket.try_acquire_at(start), 0);
        assert_eq!(bucket.try_acquire_at(start), -1);
    }

    #[test]
    fn test_denials_exceed_overflow() {
        let start = Instant::now();
        let capacity = 5;
        let bucket = TokenBucket::new_at(capacity, MINUTE, start);

        let n = 12;
        let denied = (0..n)
            .map(|i| bucket.try_acquire_at(start + Duration::from_millis(i)))
            .filter(|remaining| *remaining < 0)
            .count();
        assert!(denied >= (n as usize) - capacity as usize, "denied {denied}");
    }

    #[test]
    fn test_denial_is_reported_negative_and_not_consumed() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(1, MINUTE, start);

        assert_eq!(bucket.try_acquire_at(start), 0);
        for _ in 0..10 {
            assert!(bucket.try_acquire_at(start) < 0);
        }
        assert_eq!(bucket.available_at(start), 0.0);
    }

    #[test]
    fn test_lazy_refill_is_proportional() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(4, MINUTE, start);
        for _ in 0..4 {
            bucket.try_acquire_at(start);
        }

        // A quarter interval earns one token.
        let later = start + Duration::from_secs(15);
        assert_eq!(bucket.try_acquire_at(later), 0);
        assert_eq!(bucket.try_acquire_at(later), -1);
    }

    #[test]
    fn test_refill_caps_at_capacity() {
        let start = Instant::now();
        let bucket = TokenBucket::new_at(2, MINUTE, start);
        bucket.try_acquire_at(start);

        let much_later = start + Duration::from_secs(3600);
        assert_eq!(bucket.available_at(much_later), 2.0);
        assert_eq!(bucket.try_acquire_at(much_later), 1);
    }

    #[test]
    fn test_backwards_clock_does_not_refill_or_drain() {
        let start = Instant::now() + Duration::from_secs(10);
        let bucket = TokenBucket::new_at(2, MINUTE, start);
        bucket.try_acquire_at(start);
        bucket.try_acquire_at(start);

        let earlier = start - Duration::from_secs(5);
        assert_eq!(bucket.available_at(earlier), 0.0);
        assert_eq!(bucket.try_acquire_at(earlier), -1);

        // Returning to the original time earns nothing either.
        assert_eq!(bucket.available_at(start), 0.0);
    }

    #[test]
    fn test_two_simultaneous_callers_on_last_token() {
        for _ in 0..200 {
            let bucket = Arc::new(TokenBucket::new(1, MINUTE));
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let bucket = bucket.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        bucket.try_acquire()
                    })
                })
                .collect();

            let results: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            let admitted = results.iter().filter(|r| **r >= 0).count();
            assert_eq!(admitted, 1, "results: {results:?}");
        }
    }

    #[test]
    fn test_concurrent_callers_never_overdraw() {
        let bucket = Arc::new(TokenBucket::new(50, Duration::from_secs(3600)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bucket = bucket.clone();
                thread::spawn(move || (0..25).filter(|_| bucket.try_acquire() >= 0).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // 200 attempts against 50 tokens; an hour-long interval leaves at
        // most a fraction of a token of refill during the test.
        assert_eq!(admitted, 50);
    }

    #[test]
    fn test_snapshot_reports_capacity() {
        let bucket = TokenBucket::new(3, MINUTE);
        bucket.try_acquire();
        let snapshot = bucket.snapshot();
        assert_eq!(snapshot.capacity, 3);
        assert!(snapshot.available >= 2.0 && snapshot.available < 3.0);
    }
}
