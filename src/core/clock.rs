// Feedline - core/clock.rs
//
// Injectable source of "now". The timeline reads the clock exactly once per
// bucketing pass; the clock's time zone defines which calendar day an
// instant falls on.

use chrono::{DateTime, TimeZone, Utc};

/// Source of the current instant in a particular time zone.
pub trait Clock {
    type Tz: TimeZone;

    /// Current instant, expressed in the clock's zone.
    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock in a chosen zone (`chrono::Local` or `chrono::Utc`).
#[derive(Debug, Clone)]
pub struct SystemClock<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> SystemClock<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl<Tz: TimeZone> Clock for SystemClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// A clock frozen at one instant. Used by tests and by `--now`.
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now.clone()
    }
}
