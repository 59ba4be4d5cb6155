use chrono::{DateTime, Local};

/// Source of the capture instant for a tick.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<F: Fn() -> DateTime<Local>> Clock for F {
    fn now(&self) -> DateTime<Local> {
        self()
    }
}
