use thiserror::Error;

/// Remaining seconds below which the UI shows the low-time treatment.
pub const LOW_TIME_SECS: u32 = 60;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountdownError {
    #[error("countdown must start with a positive duration")]
    ZeroDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Stopped,
    Running,
    Expired,
}

/// Outcome of delivering one tick event to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running; the tick was discarded.
    Idle,
    /// Still counting down.
    Running { remaining: u32 },
    /// This tick crossed zero. Reported exactly once per `start`.
    Expired,
}

/// The session countdown: `Stopped -> Running -> Expired`.
///
/// This is the state machine only; the one-second cadence comes from the
/// caller delivering `tick` as a discrete event. Stopping cancels the
/// countdown without firing expiry, so a manual submit and the expiry path
/// can never both fire for the same run. Reaching zero is terminal until a
/// fresh `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining: u32,
    state: CountdownState,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or restart) counting down from `initial_secs`.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::ZeroDuration` when `initial_secs` is zero;
    /// the countdown is left untouched.
    pub fn start(&mut self, initial_secs: u32) -> Result<(), CountdownError> {
        if initial_secs == 0 {
            return Err(CountdownError::ZeroDuration);
        }
        self.remaining = initial_secs;
        self.state = CountdownState::Running;
        Ok(())
    }

    /// Cancel the countdown without firing expiry. Idempotent; a no-op once
    /// expired or already stopped.
    pub fn stop(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Stopped;
        }
    }

    /// Deliver one one-second tick.
    ///
    /// Decrements while running; the tick that reaches zero transitions to
    /// `Expired` and returns [`Tick::Expired`]. Every later tick (and any
    /// tick while stopped) returns [`Tick::Idle`], so expiry is observed at
    /// most once per run.
    pub fn tick(&mut self) -> Tick {
        if self.state != CountdownState::Running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            return Tick::Expired;
        }
        Tick::Running {
            remaining: self.remaining,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state == CountdownState::Expired
    }

    /// True while running with less than [`LOW_TIME_SECS`] left.
    #[must_use]
    pub fn is_low(&self) -> bool {
        self.is_running() && self.remaining < LOW_TIME_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_requires_positive_duration() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.start(0).unwrap_err(), CountdownError::ZeroDuration);
        assert_eq!(countdown.state(), CountdownState::Stopped);

        countdown.start(10).unwrap();
        assert!(countdown.is_running());
        assert_eq!(countdown.remaining(), 10);
    }

    #[test]
    fn ten_ticks_expire_exactly_once() {
        let mut countdown = Countdown::new();
        countdown.start(10).unwrap();

        let mut expirations = 0;
        for _ in 0..15 {
            if countdown.tick() == Tick::Expired {
                expirations += 1;
            }
        }

        assert_eq!(expirations, 1);
        assert_eq!(countdown.remaining(), 0);
        assert!(countdown.is_expired());
    }

    #[test]
    fn stop_before_ticks_never_expires() {
        let mut countdown = Countdown::new();
        countdown.start(3).unwrap();
        countdown.stop();

        for _ in 0..10 {
            assert_eq!(countdown.tick(), Tick::Idle);
        }
        assert_eq!(countdown.remaining(), 3);
        assert_eq!(countdown.state(), CountdownState::Stopped);
    }

    #[test]
    fn stop_after_expiry_is_a_no_op() {
        let mut countdown = Countdown::new();
        countdown.start(1).unwrap();
        assert_eq!(countdown.tick(), Tick::Expired);

        countdown.stop();
        assert!(countdown.is_expired());
    }

    #[test]
    fn restart_reenters_running() {
        let mut countdown = Countdown::new();
        countdown.start(1).unwrap();
        assert_eq!(countdown.tick(), Tick::Expired);

        countdown.start(5).unwrap();
        assert!(countdown.is_running());
        assert_eq!(countdown.tick(), Tick::Running { remaining: 4 });
    }

    #[test]
    fn remaining_is_monotonically_non_increasing() {
        let mut countdown = Countdown::new();
        countdown.start(5).unwrap();

        let mut last = countdown.remaining();
        for _ in 0..8 {
            countdown.tick();
            assert!(countdown.remaining() <= last);
            last = countdown.remaining();
        }
    }

    #[test]
    fn low_time_threshold() {
        let mut countdown = Countdown::new();
        countdown.start(61).unwrap();
        assert!(!countdown.is_low());
        countdown.tick();
        assert_eq!(countdown.remaining(), 60);
        assert!(!countdown.is_low());
        countdown.tick();
        assert!(countdown.is_low());
    }
}
