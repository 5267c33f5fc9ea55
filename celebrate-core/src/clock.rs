//! Wall-clock source.

use std::cell::Cell;

use chrono::{Local, NaiveDateTime};

/// Local wall-clock time, without zone. Everything date-related runs on this.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock(Cell<NaiveDateTime>);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock(Cell::new(now))
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.0.set(now);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}
