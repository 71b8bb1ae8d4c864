//! Token bucket implementation.

use std::time::Instant;

/// A single client's token bucket: plain data and arithmetic, no locking of
/// its own. The owning [`ClientState`](super::ClientState) serializes access.
///
/// The bucket starts full and refills continuously at `refill_per_sec`
/// tokens per second, computed lazily at each take attempt from the elapsed
/// wall-clock time. The balance never exceeds `capacity` and only decreases
/// on a successful take.
#[derive(Debug)]
pub struct TokenBucket {
    /// Maximum number of tokens the bucket can hold
    capacity: u32,
    /// Tokens added per second of elapsed time
    refill_per_sec: f64,
    /// Current token balance, fractional between refills
    available: f64,
    /// When the balance was last brought up to date
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a new, full bucket. The refill rate doubles as the capacity.
    pub fn new(tokens_per_sec: u32) -> Self {
        Self {
            capacity: tokens_per_sec,
            refill_per_sec: f64::from(tokens_per_sec),
            available: f64::from(tokens_per_sec),
            last_refill: Instant::now(),
        }
    }

    /// Refill the bucket for the time elapsed since the last refill, then
    /// attempt to take one token. Returns `true` if a token was taken.
    pub fn try_take(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.available = f64::from(self.capacity)
            .min(self.available + elapsed.as_secs_f64() * self.refill_per_sec);
        self.last_refill = now;

        if self.available < 1.0 {
            return false;
        }

        self.available -= 1.0;
        true
    }

    /// Current token balance as of the last refill.
    pub fn available(&self) -> f64 {
        self.available
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
