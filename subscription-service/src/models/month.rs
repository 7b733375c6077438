//! Calendar month arithmetic.
//!
//! Months are carried as a single ordinal (`year * 12 + month - 1`) so that
//! ordering, distance and stepping are plain integer operations and never
//! depend on how many days a month has.

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("month must be 1-12, got {0}")]
    MonthOutOfRange(i32),

    #[error("year must be 1-9999, got {0}")]
    YearOutOfRange(i32),

    #[error("invalid month format '{0}', expected MM-YYYY, YYYY-MM or YYYY-MM-DD")]
    Format(String),
}

/// A (year, month) pair with the day of month discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth(i32);

impl CalendarMonth {
    pub const MIN_YEAR: i32 = 1;
    pub const MAX_YEAR: i32 = 9999;

    pub fn new(year: i32, month: i32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::MonthOutOfRange(month));
        }
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(MonthError::YearOutOfRange(year));
        }
        Ok(Self(year * 12 + (month - 1)))
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    /// 1-based month number.
    pub fn month(self) -> i32 {
        self.0.rem_euclid(12) + 1
    }

    pub fn ordinal(self) -> i32 {
        self.0
    }

    /// Truncates a date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year() * 12 + date.month0() as i32)
    }

    /// First day of the month, the form months are persisted in.
    pub fn first_day(self) -> NaiveDate {
        // Every ordinal built through `new` or `from_date` is a real month.
        NaiveDate::from_ymd_opt(self.year(), self.month() as u32, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl FromStr for CalendarMonth {
    type Err = MonthError;

    /// Accepts `MM-YYYY`, `YYYY-MM` and `YYYY-MM-DD` (day is truncated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let format_err = || MonthError::Format(raw.to_string());

        let parts: Vec<&str> = raw.split('-').collect();
        let (year, month) = match parts.as_slice() {
            [mm, yyyy] if mm.len() <= 2 && yyyy.len() == 4 => (*yyyy, *mm),
            [yyyy, mm] if yyyy.len() == 4 && mm.len() <= 2 => (*yyyy, *mm),
            [_, _, _] => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| format_err())?;
                return Ok(Self::from_date(date));
            }
            _ => return Err(format_err()),
        };

        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: i32 = month.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Closed, inclusive range of calendar months a query is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start: CalendarMonth,
    end: CalendarMonth,
}

impl Period {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: CalendarMonth, end: CalendarMonth) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> CalendarMonth {
        self.start
    }

    pub fn end(&self) -> CalendarMonth {
        self.end
    }

    /// Number of months in the window, always at least one.
    pub fn month_count(&self) -> u32 {
        (self.end.0 - self.start.0 + 1) as u32
    }

    /// Every month of the window in ascending order.
    #[cfg(test)]
    pub(crate) fn months(&self) -> impl Iterator<Item = CalendarMonth> {
        (self.start.0..=self.end.0).map(CalendarMonth)
    }

    /// How many months of this window fall inside `[start, end]`, where a
    /// missing `end` means the interval never closes.
    pub fn overlap_months(&self, start: CalendarMonth, end: Option<CalendarMonth>) -> u32 {
        let from = self.start.max(start);
        let to = match end {
            Some(end) => self.end.min(end),
            None => self.end,
        };
        if from > to {
            0
        } else {
            (to.ordinal() - from.ordinal() + 1) as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: i32) -> CalendarMonth {
        CalendarMonth::new(year, month).unwrap()
    }

    #[test]
    fn rejects_month_outside_1_to_12() {
        assert_eq!(
            CalendarMonth::new(2024, 0),
            Err(MonthError::MonthOutOfRange(0))
        );
        assert_eq!(
            CalendarMonth::new(2024, 13),
            Err(MonthError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn ordinal_orders_across_year_boundary() {
        assert!(ym(2023, 12) < ym(2024, 1));
        assert_eq!(ym(2024, 1).ordinal() - ym(2023, 12).ordinal(), 1);
    }

    #[test]
    fn year_and_month_round_trip_through_ordinal() {
        let m = ym(2025, 7);
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 7);
    }

    #[test]
    fn from_date_truncates_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(CalendarMonth::from_date(date), ym(2024, 2));
        assert_eq!(ym(2024, 2).first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!("07-2025".parse::<CalendarMonth>().unwrap(), ym(2025, 7));
        assert_eq!("7-2025".parse::<CalendarMonth>().unwrap(), ym(2025, 7));
        assert_eq!("2025-07".parse::<CalendarMonth>().unwrap(), ym(2025, 7));
        assert_eq!("2025-07-15".parse::<CalendarMonth>().unwrap(), ym(2025, 7));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(matches!(
            "2025/07".parse::<CalendarMonth>(),
            Err(MonthError::Format(_))
        ));
        assert!(matches!(
            "13-2025".parse::<CalendarMonth>(),
            Err(MonthError::MonthOutOfRange(13))
        ));
        assert!("2025-02-30".parse::<CalendarMonth>().is_err());
    }

    #[test]
    fn displays_as_mm_yyyy() {
        assert_eq!(ym(2025, 7).to_string(), "07-2025");
    }

    #[test]
    fn period_rejects_reversed_bounds() {
        assert!(Period::new(ym(2024, 3), ym(2024, 2)).is_none());
        assert!(Period::new(ym(2024, 3), ym(2024, 3)).is_some());
    }

    #[test]
    fn single_month_period_yields_one_month() {
        let period = Period::new(ym(2024, 3), ym(2024, 3)).unwrap();
        assert_eq!(period.months().collect::<Vec<_>>(), vec![ym(2024, 3)]);
        assert_eq!(period.month_count(), 1);
    }

    #[test]
    fn months_step_across_years() {
        let period = Period::new(ym(2023, 11), ym(2024, 2)).unwrap();
        let months: Vec<_> = period.months().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["11-2023", "12-2023", "01-2024", "02-2024"]);
    }

    #[test]
    fn overlap_matches_month_by_month_count() {
        let period = Period::new(ym(2023, 6), ym(2025, 3)).unwrap();
        let intervals = [
            (ym(2020, 1), None),
            (ym(2024, 1), Some(ym(2024, 3))),
            (ym(2023, 1), Some(ym(2023, 6))),
            (ym(2025, 3), None),
            (ym(2025, 4), None),
            (ym(2021, 1), Some(ym(2023, 5))),
        ];

        for (start, end) in intervals {
            let by_month = period
                .months()
                .filter(|m| start <= *m && end.map_or(true, |e| *m <= e))
                .count() as u32;
            assert_eq!(
                period.overlap_months(start, end),
                by_month,
                "start={start} end={end:?}"
            );
        }
    }
}
