//! Attempt settings.

use std::time::Duration;

use thiserror::Error;

/// Default minimum percentage for a pass.
pub const DEFAULT_PASSING_THRESHOLD: u8 = 70;

/// How often the terminal driver polls the countdown.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("passing threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u8),

    #[error("time limit must be greater than zero")]
    ZeroTimeLimit,

    #[error("max attempts must be at least 1")]
    ZeroMaxAttempts,
}

/// Settings that apply to every attempt of one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    /// Minimum percentage (inclusive) to pass.
    pub passing_threshold: u8,
    pub time_limit: Option<Duration>,
    /// Total attempts allowed, counting the first. `None` is unlimited.
    pub max_attempts: Option<u32>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            time_limit: None,
            max_attempts: None,
        }
    }
}

impl QuizSettings {
    pub fn with_passing_threshold(mut self, threshold: u8) -> Self {
        self.passing_threshold = threshold;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passing_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.passing_threshold));
        }
        if self.time_limit == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(())
    }
}
