use std::time::Instant;

use chrono::Utc;

/// Wall-clock readings consumed by the animation updater.
///
/// Two clocks are sampled because the animation mixes them: shader time is
/// scaled from a monotonic page-style clock, while the camera roll follows
/// the epoch clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    /// Milliseconds since the clock was created (monotonic).
    pub monotonic_millis: f64,
    /// Milliseconds since the Unix epoch.
    pub epoch_millis: f64,
}

impl ClockReading {
    pub fn new(monotonic_millis: f64, epoch_millis: f64) -> Self {
        Self {
            monotonic_millis,
            epoch_millis,
        }
    }
}

/// Abstraction over where clock readings originate from.
pub trait Clock {
    /// Samples the clock for the upcoming frame.
    fn now(&mut self) -> ClockReading;
}

/// Clock backed by `Instant` for the monotonic part and `chrono` for the epoch part.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> ClockReading {
        let monotonic_millis = self.origin.elapsed().as_secs_f64() * 1000.0;
        let epoch_millis = Utc::now().timestamp_millis() as f64;
        ClockReading::new(monotonic_millis, epoch_millis)
    }
}

/// Clock that only moves when told to. Used for still frames and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    reading: ClockReading,
}

impl ManualClock {
    pub fn new(reading: ClockReading) -> Self {
        Self { reading }
    }

    pub fn set(&mut self, reading: ClockReading) {
        self.reading = reading;
    }

    /// Moves both clocks forward by the same amount.
    pub fn advance(&mut self, millis: f64) {
        self.reading.monotonic_millis += millis;
        self.reading.epoch_millis += millis;
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> ClockReading {
        self.reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second.monotonic_millis >= first.monotonic_millis);
        assert!(first.epoch_millis > 0.0);
    }

    #[test]
    fn manual_clock_advances_both_readings() {
        let mut clock = ManualClock::new(ClockReading::new(0.0, 1_000.0));
        clock.advance(16.0);
        assert_eq!(clock.now(), ClockReading::new(16.0, 1_016.0));
    }
}
