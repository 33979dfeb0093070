use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Clock abstracts access to the current timestamp so runs remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Wall-clock time stamped on generated reports. Defaults to local time.
    fn report_timestamp(&self) -> NaiveDateTime {
        self.now().with_timezone(&Local).naive_local()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant; report timestamps use it verbatim.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.0, Utc)
    }

    fn report_timestamp(&self) -> NaiveDateTime {
        self.0
    }
}
