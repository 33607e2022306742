//! Clock abstraction.
//!
//! Every ledger operation takes exactly one [`ClockReading`] and reuses it
//! for all fields it populates, so an operation that straddles a moment
//! boundary never records an inconsistent date/time pair. Production code
//! uses [`SystemClock`]; tests inject [`FixedClock`].

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};

/// A single observation of "now", taken once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Current local calendar date.
    pub date: NaiveDate,
    /// Current local time of day, truncated to whole seconds.
    pub time: NaiveTime,
    /// Current instant in UTC, for audit timestamps.
    pub utc: DateTime<Utc>,
}

/// Source of clock readings.
pub trait Clock {
    /// Takes one consistent reading of the current date and time.
    fn read(&self) -> ClockReading;
}

/// Clock backed by the system's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn read(&self) -> ClockReading {
        let now = Local::now();
        let time = now.time();
        ClockReading {
            date: now.date_naive(),
            // Sub-second precision is noise for attendance records; the
            // stored format is HH:MM:SS.
            time: time.with_nanosecond(0).unwrap_or(time),
            utc: now.with_timezone(&Utc),
        }
    }
}

/// Clock that always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(ClockReading);

impl FixedClock {
    /// Creates a fixed clock from a reading.
    #[must_use]
    pub const fn new(reading: ClockReading) -> Self {
        Self(reading)
    }
}

impl Clock for FixedClock {
    fn read(&self) -> ClockReading {
        self.0
    }
}
