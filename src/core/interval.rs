//! Compact age thresholds such as `30m`, `3d` or `1M`.
//!
//! The grammar is `[0-9]+[smhdwMy]`, matched against the whole string. Unit
//! letters are case-sensitive: `m` is minutes and `M` is months.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("invalid interval {0:?}: expected <number><s|m|h|d|w|M|y>")]
    Invalid(String),
    #[error("interval {0} reaches outside the representable time range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    fn from_letter(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Second),
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            'M' => Some(Self::Month),
            'y' => Some(Self::Year),
            _ => None,
        }
    }

    fn letter(self) -> char {
        match self {
            Self::Second => 's',
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'M',
            Self::Year => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSpec {
    pub magnitude: u32,
    pub unit: IntervalUnit,
}

impl IntervalSpec {
    pub fn new(magnitude: u32, unit: IntervalUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn parse(raw: &str) -> Result<Self, IntervalError> {
        let invalid = || IntervalError::Invalid(raw.to_string());

        let mut chars = raw.chars();
        let unit = chars
            .next_back()
            .and_then(IntervalUnit::from_letter)
            .ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude = digits.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self { magnitude, unit })
    }

    /// Point in time `now - self`. Months and years follow the calendar, so
    /// a day-of-month that does not exist in the target month is clamped to
    /// that month's last day.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, IntervalError> {
        let n = i64::from(self.magnitude);
        let cutoff = match self.unit {
            IntervalUnit::Second => TimeDelta::try_seconds(n).and_then(|d| now.checked_sub_signed(d)),
            IntervalUnit::Minute => TimeDelta::try_minutes(n).and_then(|d| now.checked_sub_signed(d)),
            IntervalUnit::Hour => TimeDelta::try_hours(n).and_then(|d| now.checked_sub_signed(d)),
            IntervalUnit::Day => TimeDelta::try_days(n).and_then(|d| now.checked_sub_signed(d)),
            IntervalUnit::Week => TimeDelta::try_weeks(n).and_then(|d| now.checked_sub_signed(d)),
            IntervalUnit::Month => now.checked_sub_months(Months::new(self.magnitude)),
            IntervalUnit::Year => self
                .magnitude
                .checked_mul(12)
                .and_then(|months| now.checked_sub_months(Months::new(months))),
        };
        cutoff.ok_or_else(|| IntervalError::OutOfRange(self.to_string()))
    }
}

impl FromStr for IntervalSpec {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_every_unit() {
        let cases = [
            ("15s", 15, IntervalUnit::Second),
            ("5m", 5, IntervalUnit::Minute),
            ("12h", 12, IntervalUnit::Hour),
            ("3d", 3, IntervalUnit::Day),
            ("2w", 2, IntervalUnit::Week),
            ("5M", 5, IntervalUnit::Month),
            ("1y", 1, IntervalUnit::Year),
            ("007d", 7, IntervalUnit::Day),
            ("0s", 0, IntervalUnit::Second),
        ];
        for (raw, magnitude, unit) in cases {
            assert_eq!(
                IntervalSpec::parse(raw),
                Ok(IntervalSpec::new(magnitude, unit)),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_unit_case_is_significant() {
        let minutes: IntervalSpec = "5m".parse().unwrap();
        let months: IntervalSpec = "5M".parse().unwrap();
        assert_ne!(minutes, months);
        assert_eq!(minutes.to_string(), "5m");
        assert_eq!(months.to_string(), "5M");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let bad = [
            "", "d", "3", "3D", "3H", "3x", "3dd", " 3d", "3d ", "-3d", "+3d", "3.5d", "d3",
            "3 d", "٣d", "99999999999d",
        ];
        for raw in bad {
            assert_eq!(
                IntervalSpec::parse(raw),
                Err(IntervalError::Invalid(raw.to_string())),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_cutoff_fixed_units() {
        let now = at(2024, 6, 15, 12, 0, 0);
        let spec = |s: &str| IntervalSpec::parse(s).unwrap();

        assert_eq!(spec("30s").cutoff(now).unwrap(), at(2024, 6, 15, 11, 59, 30));
        assert_eq!(spec("90m").cutoff(now).unwrap(), at(2024, 6, 15, 10, 30, 0));
        assert_eq!(spec("2h").cutoff(now).unwrap(), at(2024, 6, 15, 10, 0, 0));
        assert_eq!(spec("1d").cutoff(now).unwrap(), now - TimeDelta::hours(24));
        assert_eq!(spec("1w").cutoff(now).unwrap(), spec("7d").cutoff(now).unwrap());
        assert_eq!(spec("0d").cutoff(now).unwrap(), now);
    }

    #[test]
    fn test_cutoff_calendar_months() {
        let spec = |s: &str| IntervalSpec::parse(s).unwrap();

        // No February 31st: clamp to the month's last day.
        assert_eq!(
            spec("1M").cutoff(at(2023, 3, 31, 8, 0, 0)).unwrap(),
            at(2023, 2, 28, 8, 0, 0)
        );
        assert_eq!(
            spec("1M").cutoff(at(2024, 3, 31, 8, 0, 0)).unwrap(),
            at(2024, 2, 29, 8, 0, 0)
        );
        assert_eq!(
            spec("13M").cutoff(at(2024, 1, 10, 0, 0, 0)).unwrap(),
            at(2022, 12, 10, 0, 0, 0)
        );
    }

    #[test]
    fn test_cutoff_calendar_years() {
        let spec = |s: &str| IntervalSpec::parse(s).unwrap();

        assert_eq!(
            spec("1y").cutoff(at(2024, 2, 29, 0, 0, 0)).unwrap(),
            at(2023, 2, 28, 0, 0, 0)
        );
        assert_eq!(
            spec("4y").cutoff(at(2024, 2, 29, 0, 0, 0)).unwrap(),
            at(2020, 2, 29, 0, 0, 0)
        );
    }

    #[test]
    fn test_cutoff_out_of_range() {
        let now = at(2024, 1, 1, 0, 0, 0);
        let spec = IntervalSpec::new(u32::MAX, IntervalUnit::Year);
        assert!(matches!(spec.cutoff(now), Err(IntervalError::OutOfRange(_))));
    }
}
