//! Suspension point used when the log has no new data

use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the follow loop waits before retrying a read that found nothing.
/// Implementations may block on filesystem notifications instead of sleeping.
pub trait WaitStrategy: Send {
    fn wait(&mut self);
}

/// Fixed-interval sleep
#[derive(Debug, Clone, Copy)]
pub struct PollWait {
    interval: Duration,
}

impl PollWait {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollWait {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl WaitStrategy for PollWait {
    fn wait(&mut self) {
        std::thread::sleep(self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_interval() {
        assert_eq!(PollWait::default().interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_wait_sleeps_at_least_interval() {
        let mut wait = PollWait::new(Duration::from_millis(5));
        let start = Instant::now();
        wait.wait();
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
