use crate::due::utc_date;
use time::Date;
use time::OffsetDateTime;

/// Source of the reference instant for reviews and due-set selection.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    /// The current UTC calendar date.
    fn today(&self) -> Date {
        utc_date(self.now())
    }
}

pub struct UtcClock;

impl Clock for UtcClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
