//! Turning the date and time strings a user types into a birth instant.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid time `{0}`, expected HH:MM or HH:MM:SS")]
    Time(String),

    #[error("{0} does not exist on the local clock")]
    Nonexistent(String),

    #[error("birth instant {0} is in the future")]
    Future(String),
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM[:SS]` time into an instant in
/// `tz`, rejecting anything later than `now`.
pub fn parse_birth<Tz: TimeZone>(
    date: &str,
    time: &str,
    tz: &Tz,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>, InputError> {
    let date_str = date.trim();
    let time_str = time.trim();

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| InputError::Date(date_str.to_owned()))?;
    let time = NaiveTime::parse_from_str(time_str, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M"))
        .map_err(|_| InputError::Time(time_str.to_owned()))?;

    let naive = date.and_time(time);
    let birth = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| InputError::Nonexistent(naive.to_string()))?;

    if birth > *now {
        return Err(InputError::Future(naive.to_string()));
    }

    Ok(birth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_date_and_minutes() {
        let birth = parse_birth("1992-06-14", "07:30", &Utc, &now()).unwrap();
        assert_eq!(birth, Utc.with_ymd_and_hms(1992, 6, 14, 7, 30, 0).unwrap());
    }

    #[test]
    fn accepts_seconds_and_whitespace() {
        let birth = parse_birth(" 1992-06-14 ", "07:30:15\n", &Utc, &now()).unwrap();
        assert_eq!(birth, Utc.with_ymd_and_hms(1992, 6, 14, 7, 30, 15).unwrap());
    }

    #[test]
    fn uses_the_given_zone() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = now().with_timezone(&tz);
        let birth = parse_birth("2000-01-01", "08:00", &tz, &now).unwrap();
        assert_eq!(
            birth.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            parse_birth("1992-13-01", "00:00", &Utc, &now()),
            Err(InputError::Date("1992-13-01".into()))
        );
        assert_eq!(
            parse_birth("14/06/1992", "00:00", &Utc, &now()),
            Err(InputError::Date("14/06/1992".into()))
        );
        assert_eq!(
            parse_birth("1992-06-14", "25:00", &Utc, &now()),
            Err(InputError::Time("25:00".into()))
        );
        assert_eq!(
            parse_birth("1992-06-14", "", &Utc, &now()),
            Err(InputError::Time(String::new()))
        );
    }

    #[test]
    fn rejects_future_birth() {
        let err = parse_birth("2030-01-01", "00:00", &Utc, &now()).unwrap_err();
        assert!(matches!(err, InputError::Future(_)));
    }
}
