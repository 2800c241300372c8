//! A simple stopwatch over monotonic time.

use std::time::{Duration, Instant};

/// Stopwatch for timing engine work.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    started_at: Instant,
    elapsed: Duration,
    running: bool,
}

impl Clock {
    /// Create a stopped clock with zero elapsed time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    /// Start (or restart) measuring from now.
    pub fn start(&mut self) {
        self.started_at = Instant::now();
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    /// Stop measuring and record the elapsed time.
    pub fn stop(&mut self) {
        if self.running {
            self.elapsed = self.started_at.elapsed();
            self.running = false;
        }
    }

    /// Elapsed time: live while running, frozen after `stop`.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        if self.running {
            self.started_at.elapsed()
        } else {
            self.elapsed
        }
    }

    /// Returns `true` while the clock is measuring.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_is_stopped() {
        let clock = Clock::new();
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn stop_freezes_elapsed() {
        let mut clock = Clock::new();
        clock.start();
        assert!(clock.is_running());

        clock.stop();
        let frozen = clock.elapsed();
        assert_eq!(clock.elapsed(), frozen);
    }
}
