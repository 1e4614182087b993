//! Kerbin calendar: six-hour days, 426-day years, time zero at Year 1, Day 1.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, SECONDS_PER_YEAR};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("empty time value")]
    Empty,
    #[error("'{0}' is neither seconds nor a 'year:day' date")]
    Malformed(String),
    #[error("year and day are counted from 1, got '{0}'")]
    ZeroComponent(String),
}

/// Universal time broken down into Kerbin calendar components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KerbinTime {
    total_seconds: f64,
    pub years: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: f64,
}

impl KerbinTime {
    /// Break `total_seconds` since epoch into calendar components.
    pub fn from_seconds(total_seconds: f64) -> Self {
        let mut rest = total_seconds;
        let years = (rest / SECONDS_PER_YEAR).floor();
        rest -= years * SECONDS_PER_YEAR;
        let days = (rest / SECONDS_PER_DAY).floor();
        rest -= days * SECONDS_PER_DAY;
        let hours = (rest / SECONDS_PER_HOUR).floor();
        rest -= hours * SECONDS_PER_HOUR;
        let minutes = (rest / SECONDS_PER_MINUTE).floor();
        rest -= minutes * SECONDS_PER_MINUTE;

        Self {
            total_seconds,
            years: years as i64 + 1,
            days: days as i64 + 1,
            hours: hours as i64,
            minutes: minutes as i64,
            seconds: rest,
        }
    }

    /// Start of the given calendar day (both counted from 1).
    pub fn from_year_day(year: u32, day: u32) -> Result<Self, TimeParseError> {
        if year == 0 || day == 0 {
            return Err(TimeParseError::ZeroComponent(format!("{year}:{day}")));
        }
        let total = f64::from(year - 1) * SECONDS_PER_YEAR + f64::from(day - 1) * SECONDS_PER_DAY;
        Ok(Self::from_seconds(total))
    }

    /// Parse either plain seconds (`"1234.5"`) or a calendar date (`"3:120"`).
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimeParseError::Empty);
        }

        if let Some((year, day)) = trimmed.split_once(':') {
            let year: u32 = year
                .trim()
                .parse()
                .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;
            let day: u32 = day
                .trim()
                .parse()
                .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;
            return Self::from_year_day(year, day);
        }

        match trimmed.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => Ok(Self::from_seconds(seconds)),
            _ => Err(TimeParseError::Malformed(trimmed.to_string())),
        }
    }

    /// Seconds since epoch.
    pub fn as_seconds(&self) -> f64 {
        self.total_seconds
    }

    #[must_use]
    pub fn add_seconds(&self, seconds: f64) -> Self {
        Self::from_seconds(self.total_seconds + seconds)
    }
}

impl FromStr for KerbinTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KerbinTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Y {}, D {}, {}:{:02}:{:02}",
            self.years,
            self.days,
            self.hours,
            self.minutes,
            self.seconds.floor() as i64
        )
    }
}

/// Format a duration in seconds as `Xy Xd Xh Xm` using Kerbin days and years.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let years = (total / SECONDS_PER_YEAR).floor();
    let mut rest = total - years * SECONDS_PER_YEAR;
    let days = (rest / SECONDS_PER_DAY).floor();
    rest -= days * SECONDS_PER_DAY;
    let hours = (rest / SECONDS_PER_HOUR).floor();
    rest -= hours * SECONDS_PER_HOUR;
    let minutes = (rest / SECONDS_PER_MINUTE).floor();
    format!("{years}y {days}d {hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_year_one_day_one() {
        let t = KerbinTime::from_seconds(0.0);
        assert_eq!((t.years, t.days, t.hours, t.minutes), (1, 1, 0, 0));
        assert_eq!(t.to_string(), "Y 1, D 1, 0:00:00");
    }

    #[test]
    fn components_follow_kerbin_radix() {
        let total = 2.0 * SECONDS_PER_YEAR + 5.0 * SECONDS_PER_DAY + 3.0 * 3600.0 + 7.0 * 60.0 + 9.5;
        let t = KerbinTime::from_seconds(total);
        assert_eq!((t.years, t.days, t.hours, t.minutes), (3, 6, 3, 7));
        assert!((t.seconds - 9.5).abs() < 1e-6);
        assert_eq!(t.to_string(), "Y 3, D 6, 3:07:09");
    }

    #[test]
    fn parses_calendar_dates_and_seconds() {
        let date = KerbinTime::parse("2:11").unwrap();
        assert_eq!(date.as_seconds(), SECONDS_PER_YEAR + 10.0 * SECONDS_PER_DAY);
        assert_eq!((date.years, date.days), (2, 11));

        let plain: KerbinTime = "4500.25".parse().unwrap();
        assert_eq!(plain.as_seconds(), 4500.25);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(KerbinTime::parse("  "), Err(TimeParseError::Empty));
        assert!(matches!(
            KerbinTime::parse("abc"),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            KerbinTime::parse("1:x"),
            Err(TimeParseError::Malformed(_))
        ));
        assert!(matches!(
            KerbinTime::parse("0:4"),
            Err(TimeParseError::ZeroComponent(_))
        ));
        assert!(matches!(
            KerbinTime::parse("inf"),
            Err(TimeParseError::Malformed(_))
        ));
    }

    #[test]
    fn adding_seconds_rolls_over_days_and_years() {
        let last_hour = KerbinTime::from_year_day(1, 426).unwrap().add_seconds(5.0 * 3_600.0);
        assert_eq!((last_hour.years, last_hour.days, last_hour.hours), (1, 426, 5));

        let next_year = last_hour.add_seconds(3_600.0);
        assert_eq!((next_year.years, next_year.days, next_year.hours), (2, 1, 0));
        assert_eq!(next_year.as_seconds(), SECONDS_PER_YEAR);
    }

    #[test]
    fn duration_uses_kerbin_days() {
        assert_eq!(format_duration(SECONDS_PER_DAY + 90.0), "0y 1d 0h 1m");
        assert_eq!(format_duration(-5.0), "0y 0d 0h 0m");
    }
}
