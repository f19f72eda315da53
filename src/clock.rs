use chrono::{DateTime, Local, TimeZone};

/// Source of "now" for the live loop.
///
/// The loop never reads the system clock directly, so tests can drive it
/// from a fixed or virtual timeline.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock of the host, in its local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        type Tz = Utc;

        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn fixed_clock_returns_given_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 10, 2, 9, 0, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }

    #[test]
    fn system_clock_moves_forward() {
        let first = SystemClock.now();
        let second = SystemClock.now();
        assert!(second >= first);
    }
}
