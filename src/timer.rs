//! Time source and the attempt countdown.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Elapsed/remaining time for one attempt.
///
/// Without a limit it only measures elapsed time and never expires. Once
/// stopped, elapsed time is frozen and expiry is never reported again.
pub struct Countdown {
    clock: Rc<dyn Clock>,
    limit: Option<Duration>,
    started_at: Instant,
    stopped_at: Option<Instant>,
}

impl Countdown {
    pub fn start(clock: Rc<dyn Clock>, limit: Option<Duration>) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            limit,
            started_at,
            stopped_at: None,
        }
    }

    /// Starts over from the current instant.
    pub fn restart(&mut self) {
        self.started_at = self.clock.now();
        self.stopped_at = None;
    }

    /// Stops the countdown. Calling it again keeps the first stop time.
    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.clock.now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(|| self.clock.now());
        end.saturating_duration_since(self.started_at)
    }

    /// Time left, capped at zero. `None` when there is no limit.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit.map(|limit| limit.saturating_sub(self.elapsed()))
    }

    pub fn is_expired(&self) -> bool {
        self.is_running() && self.remaining() == Some(Duration::ZERO)
    }
}

impl fmt::Debug for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Countdown")
            .field("limit", &self.limit)
            .field("elapsed", &self.elapsed())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Formats a duration as `mm:ss`.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(limit: Option<Duration>) -> (ManualClock, Countdown) {
        let clock = ManualClock::new();
        let countdown = Countdown::start(Rc::new(clock.clone()), limit);
        (clock, countdown)
    }

    #[test]
    fn test_remaining_counts_down_and_saturates() {
        let (clock, countdown) = countdown(Some(Duration::from_secs(60)));
        assert_eq!(countdown.remaining(), Some(Duration::from_secs(60)));

        clock.advance(Duration::from_secs(45));
        assert_eq!(countdown.remaining(), Some(Duration::from_secs(15)));
        assert!(!countdown.is_expired());

        clock.advance(Duration::from_secs(30));
        assert_eq!(countdown.remaining(), Some(Duration::ZERO));
        assert!(countdown.is_expired());
    }

    #[test]
    fn test_stop_freezes_and_disarms() {
        let (clock, mut countdown) = countdown(Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(4));
        countdown.stop();
        clock.advance(Duration::from_secs(20));

        assert_eq!(countdown.elapsed(), Duration::from_secs(4));
        assert!(!countdown.is_expired());

        countdown.stop();
        assert_eq!(countdown.elapsed(), Duration::from_secs(4));
    }

    #[test]
    fn test_restart() {
        let (clock, mut countdown) = countdown(Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(10));
        countdown.stop();
        countdown.restart();

        assert!(countdown.is_running());
        assert_eq!(countdown.remaining(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_unlimited_never_expires() {
        let (clock, countdown) = countdown(None);
        clock.advance(Duration::from_secs(3600));
        assert_eq!(countdown.remaining(), None);
        assert!(!countdown.is_expired());
        assert_eq!(countdown.elapsed(), Duration::from_secs(3600));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::from_secs(0)), "00:00");
        assert_eq!(format_clock(Duration::from_secs(754)), "12:34");
    }
}
