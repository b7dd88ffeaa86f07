use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::CONFIG;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Reject,
}

#[derive(Debug)]
struct RateWindow {
    start: Instant,
    count: u32,
}

/// Fixed-window admission counter guarding the upstream quota.
///
/// Process local and lost on restart. The window is only ever touched through
/// [`RateLimiter::admit`], which applies reset-then-count as one step.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: u32,
    state: Mutex<RateWindow>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_per_window: u32) -> Self {
        Self {
            window,
            max_per_window,
            state: Mutex::new(RateWindow {
                start: Instant::now(),
                count: 0,
            }),
        }
    }

    pub fn from_config() -> Self {
        Self::new(
            Duration::from_millis(CONFIG.rate_window_ms),
            CONFIG.rate_max_per_window,
        )
    }

    pub fn admit(&self) -> Admission {
        self.admit_at(Instant::now())
    }

    pub fn admit_at(&self, now: Instant) -> Admission {
        // the critical section cannot panic, so poisoning carries no broken invariant
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if now.saturating_duration_since(state.start) > self.window {
            state.start = now;
            state.count = 0;
        }

        if state.count >= self.max_per_window {
            return Admission::Reject;
        }
        state.count += 1;
        Admission::Allow
    }
}

#[test]
fn test_window_rolls_over_only_after_duration() {
    let limiter = RateLimiter::new(Duration::from_millis(1000), 2);
    let t0 = limiter.state.lock().unwrap().start;

    assert_eq!(limiter.admit_at(t0), Admission::Allow);
    assert_eq!(limiter.admit_at(t0 + Duration::from_millis(500)), Admission::Allow);
    assert_eq!(limiter.admit_at(t0 + Duration::from_millis(999)), Admission::Reject);
    // exactly at the boundary the window is still current
    assert_eq!(limiter.admit_at(t0 + Duration::from_millis(1000)), Admission::Reject);
    assert_eq!(limiter.admit_at(t0 + Duration::from_millis(1001)), Admission::Allow);
    assert_eq!(limiter.state.lock().unwrap().count, 1);
}
