use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Advisory sliding-window gate on outbound API calls.
///
/// `try_acquire` does not reserve a slot; callers record the call
/// themselves once it is actually made. The window lives in memory only:
/// losing it on restart merely relaxes limiting, never breaks safety.
pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    calls: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    /// One-hour window with the given call capacity.
    pub fn per_hour(capacity: usize) -> Self {
        Self::new(capacity, Duration::from_secs(60 * 60))
    }

    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity,
            window,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prune timestamps older than the window, then check for headroom.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Record a call that was actually made.
    pub fn record(&self) {
        self.record_at(Instant::now());
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut calls = self.calls.lock().unwrap();
        calls.retain(|at| now.duration_since(*at) < self.window);
        calls.len() < self.capacity
    }

    fn record_at(&self, now: Instant) {
        self.calls.lock().unwrap().push(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_refuses_until_it_slides() {
        let window = Duration::from_secs(3600);
        let limiter = RateLimiter::new(20, window);
        let t0 = Instant::now();

        for _ in 0..20 {
            limiter.record_at(t0);
        }
        assert!(!limiter.try_acquire_at(t0));

        // Past the window every recorded call is pruned.
        assert!(limiter.try_acquire_at(t0 + window + Duration::from_secs(1)));
    }

    #[test]
    fn only_expired_calls_are_pruned() {
        let window = Duration::from_secs(3600);
        let limiter = RateLimiter::new(2, window);
        let t0 = Instant::now();

        limiter.record_at(t0);
        limiter.record_at(t0 + Duration::from_secs(1800));
        assert!(!limiter.try_acquire_at(t0 + Duration::from_secs(1800)));

        // 61 minutes in: the first call has aged out, the second has not.
        let t = t0 + Duration::from_secs(3660);
        assert!(limiter.try_acquire_at(t));
        limiter.record_at(t);
        assert!(!limiter.try_acquire_at(t));
    }

    #[test]
    fn acquire_without_record_reserves_nothing() {
        let limiter = RateLimiter::new(1, Duration::from_secs(3600));
        let t0 = Instant::now();
        assert!(limiter.try_acquire_at(t0));
        assert!(limiter.try_acquire_at(t0));
        limiter.record_at(t0);
        assert!(!limiter.try_acquire_at(t0));
    }
}
