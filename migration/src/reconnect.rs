//! # Reconnect Scheduler
//!
//! Bounded-retry schedule for the client reconnect loop. The first attempt
//! waits the initial delay so the new host has time to finish promoting;
//! each failed attempt schedules the next one further out, and the loop
//! gives up after the configured maximum with no trailing delay.

use std::time::Duration;

/// Retry policy for the client reconnect loop.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of connection attempts before giving up
    pub max_attempts: u32,

    /// Delay schedule: `delays[0]` runs before the first attempt, and
    /// `delays[n]` after the n-th failure. The last entry repeats if there
    /// are more attempts than entries.
    pub delays: Vec<Duration>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delays: vec![
                Duration::from_millis(1500),
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(4),
                Duration::from_secs(5),
            ],
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule the next attempt after this delay
    Retry(Duration),

    /// All attempts exhausted
    GiveUp,
}

/// Tracks attempts within one reconnect cycle.
#[derive(Debug)]
pub struct ReconnectScheduler {
    config: ReconnectConfig,
    attempt: u32,
}

impl ReconnectScheduler {
    pub fn new(config: ReconnectConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Start a fresh cycle.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Delay before the first attempt, giving the new host time to finish
    /// promoting.
    pub fn initial_delay(&self) -> Duration {
        self.delay_at(0)
    }

    /// Record the start of the next attempt; `false` means the budget is
    /// already exhausted and the caller must terminate with failure.
    pub fn begin_attempt(&mut self) -> bool {
        self.attempt += 1;
        self.attempt <= self.config.max_attempts
    }

    /// Attempts started so far in this cycle.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Decide what follows a failed attempt. After the final allowed
    /// attempt this gives up immediately rather than scheduling one more
    /// delay that could never lead to an attempt.
    pub fn on_attempt_failed(&self) -> RetryDecision {
        if self.attempt >= self.config.max_attempts {
            RetryDecision::GiveUp
        } else {
            RetryDecision::Retry(self.delay_at(self.attempt as usize))
        }
    }

    /// Schedule entry for the n-th wait, clamped to the last entry.
    fn delay_at(&self, n: usize) -> Duration {
        let delays = &self.config.delays;
        delays
            .get(n)
            .or_else(|| delays.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}
