//! Calendar-month keys (`YYYY-MM`), the unit of filtering and recurrence
//! materialization.

use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month, OffsetDateTime};

use crate::Error;

/// A calendar month, e.g. `2025-03`.
///
/// Periods order chronologically, so they can be compared to decide whether
/// a recurring payment had started by a given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    /// Create a period for the given calendar month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The period that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The current calendar month (UTC).
    pub fn current() -> Self {
        Self::from_date(OffsetDateTime::now_utc().date())
    }

    /// The year component.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month component.
    pub fn month(&self) -> Month {
        self.month
    }

    /// Whether `date` falls within this calendar month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The calendar month immediately after this one.
    pub fn next(&self) -> Self {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }

    /// The date in this month with the given day of month, clamped to the
    /// month's length.
    ///
    /// A day of 31 lands on the 28th (or 29th) in February.
    pub fn day_clamped(&self, day: u8) -> Date {
        let last_day = self.last_day().day();

        Date::from_calendar_date(self.year, self.month, day.clamp(1, last_day))
            .expect("a day clamped to the month length is always valid")
    }

    /// The last day of this month.
    pub fn last_day(&self) -> Date {
        let next = self.next();

        Date::from_calendar_date(next.year, next.month, 1)
            .expect("the first of a month is always a valid date")
            .previous_day()
            .expect("the first of a month always has a preceding day")
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, u8::from(self.month)).cmp(&(other.year, u8::from(other.month)))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parse_error = || Error::InvalidPeriod(text.to_string());

        let (year_text, month_text) = text.split_once('-').ok_or_else(parse_error)?;
        let year = year_text.parse::<i32>().map_err(|_| parse_error())?;
        let month_number = month_text.parse::<u8>().map_err(|_| parse_error())?;
        let month = Month::try_from(month_number).map_err(|_| parse_error())?;

        Ok(Self::new(year, month))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod period_tests {
    use time::{Month, macros::date};

    use crate::Error;

    use super::Period;

    #[test]
    fn parse_round_trips_through_display() {
        let period: Period = "2025-03".parse().unwrap();

        assert_eq!(period, Period::new(2025, Month::March));
        assert_eq!(period.to_string(), "2025-03");
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["2025", "2025-13", "2025-00", "march", "2025-3x"] {
            assert_eq!(
                text.parse::<Period>(),
                Err(Error::InvalidPeriod(text.to_string())),
                "{text} should not parse"
            );
        }
    }

    #[test]
    fn periods_order_chronologically() {
        let december: Period = "2024-12".parse().unwrap();
        let january: Period = "2025-01".parse().unwrap();

        assert!(december < january);
    }

    #[test]
    fn contains_matches_only_the_same_month() {
        let period = Period::new(2025, Month::March);

        assert!(period.contains(date!(2025 - 03 - 01)));
        assert!(period.contains(date!(2025 - 03 - 31)));
        assert!(!period.contains(date!(2025 - 02 - 28)));
        assert!(!period.contains(date!(2024 - 03 - 15)));
    }

    #[test]
    fn next_rolls_over_the_year() {
        let december = Period::new(2024, Month::December);

        assert_eq!(december.next(), Period::new(2025, Month::January));
    }

    #[test]
    fn day_clamped_keeps_valid_days() {
        let march = Period::new(2025, Month::March);

        assert_eq!(march.day_clamped(5), date!(2025 - 03 - 05));
        assert_eq!(march.day_clamped(31), date!(2025 - 03 - 31));
    }

    #[test]
    fn day_clamped_shortens_to_month_length() {
        let february = Period::new(2025, Month::February);

        assert_eq!(february.day_clamped(31), date!(2025 - 02 - 28));
    }

    #[test]
    fn day_clamped_respects_leap_years() {
        let february = Period::new(2024, Month::February);

        assert_eq!(february.day_clamped(31), date!(2024 - 02 - 29));
    }
}
