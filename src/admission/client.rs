//! Per-client admission state.

use std::time::{Duration, Instant};

use super::bucket::TokenBucket;
use crate::config::ClientLimits;

/// Length of the fixed admission window.
const WINDOW: Duration = Duration::from_secs(1);

/// Mutable per-client record holding both policies' working state.
///
/// The registry hands this out behind a per-client mutex; all mutation
/// happens with that lock held, so the fields themselves need no atomics.
/// Both admission operations share the same window counter, and window
/// resets happen lazily on each call rather than on a timer, so an idle
/// client costs nothing.
#[derive(Debug)]
pub struct ClientState {
    /// Resolved limits, fixed at creation time
    limits: ClientLimits,
    /// Requests admitted in the current window
    window_count: u32,
    /// When the current window started
    window_start: Instant,
    /// Token-bucket state, independent of the window counter
    bucket: TokenBucket,
}

impl ClientState {
    /// Create state for a newly seen client from its resolved limits.
    pub fn new(limits: ClientLimits) -> Self {
        let bucket = TokenBucket::new(limits.tokens_per_sec);
        Self {
            limits,
            window_count: 0,
            window_start: Instant::now(),
            bucket,
        }
    }

    /// The limits this client was provisioned with.
    pub fn limits(&self) -> &ClientLimits {
        &self.limits
    }

    /// Run the fixed-window check: lazily reset the window if it has
    /// elapsed, then admit and count the request unless the cap is reached.
    ///
    /// The counter is incremented only on the admit branch, so it can reach
    /// `request_max` but never exceed it.
    pub fn admit_window(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_start) >= WINDOW {
            self.window_count = 0;
            self.window_start = now;
        }

        if self.window_count >= self.limits.request_max {
            return false;
        }

        self.window_count += 1;
        true
    }

    /// Attempt to take one token from this client's bucket.
    pub fn take_token(&mut self, now: Instant) -> bool {
        self.bucket.try_take(now)
    }

    /// Requests admitted in the current window.
    pub fn window_count(&self) -> u32 {
        self.window_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(request_max: u32, tokens_per_sec: u32) -> ClientLimits {
        ClientLimits {
            client_id: "test".to_string(),
            request_max,
            tokens_per_sec,
        }
    }

    #[test]
    fn test_window_admits_up_to_cap() {
        let mut state = ClientState::new(limits(3, 5));
        let now = Instant::now();

        assert!(state.admit_window(now));
        assert!(state.admit_window(now));
        assert!(state.admit_window(now));
        assert!(!state.admit_window(now));
        assert_eq!(state.window_count(), 3);
    }

    #[test]
    fn test_window_resets_after_one_second() {
        let mut state = ClientState::new(limits(2, 5));
        let start = Instant::now();

        assert!(state.admit_window(start));
        assert!(state.admit_window(start));
        assert!(!state.admit_window(start));

        let later = start + WINDOW;
        assert!(state.admit_window(later));
        assert_eq!(state.window_count(), 1);
    }

    #[test]
    fn test_rejection_does_not_count() {
        let mut state = ClientState::new(limits(1, 5));
        let now = Instant::now();

        assert!(state.admit_window(now));
        assert!(!state.admit_window(now));
        assert!(!state.admit_window(now));
        assert_eq!(state.window_count(), 1);
    }
}
