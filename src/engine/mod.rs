//! Access to Bikram Sambat date arithmetic.
//!
//! The month view only needs a handful of queries from a calendar engine.
//! They are collected in [`DateEngine`] so any conversion backend can be
//! plugged in. [`TableEngine`] is the backend shipped with this crate.

mod table;

pub use table::TableEngine;

use std::fmt;

use crate::error::Result;

/// A date in the Bikram Sambat calendar. `month` is 0-based (Baisakh = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BsDate {
    year: i32,
    month: u32,
    day: u32,
}

impl BsDate {
    /// Builds a date without validation. Engines use this after checking the
    /// fields against their own tables.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        BsDate { year, month, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month + 1, self.day)
    }
}

pub trait DateEngine {
    /// Validated construction of a date.
    fn date(&self, year: i32, month: u32, day: u32) -> Result<BsDate>;

    /// The current date in this calendar system. Queried on every call.
    fn today(&self) -> Result<BsDate>;

    /// Day of week with Sunday = 0 .. Saturday = 6.
    fn weekday(&self, date: &BsDate) -> Result<u32>;

    fn days_in_month(&self, year: i32, month: u32) -> Result<u32>;

    /// Moves by whole months, carrying into the year. The day is clamped to
    /// the length of the target month.
    fn add_months(&self, date: &BsDate, months: i32) -> Result<BsDate>;

    /// Moves by whole years keeping the month. The day is clamped to the
    /// length of the target month.
    fn add_years(&self, date: &BsDate, years: i32) -> Result<BsDate>;
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::{BsDate, DateEngine, TableEngine};
    use crate::error::{Error, ErrorKind, Result};
    use chrono::NaiveDate;
    use std::cell::Cell;

    /// Small in-memory table for tests. 2081 Baisakh 1 falls on Saturday
    /// 2024-04-13, 2082 Baisakh 1 on Monday 2025-04-14.
    pub fn engine() -> TableEngine {
        TableEngine::new(
            NaiveDate::from_ymd_opt(2024, 4, 13).unwrap(),
            2081,
            vec![
                [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 29, 31],
                [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30],
                [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30],
            ],
        )
        .unwrap()
    }

    /// Same table with "today" pinned to a Gregorian date.
    pub fn engine_at(year: i32, month: u32, day: u32) -> TableEngine {
        engine().with_fixed_today(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    /// Engine with 30-day months whose "today" can be moved between calls.
    /// 2000 Baisakh 1 is a Sunday.
    pub struct ClockEngine {
        today: Cell<BsDate>,
    }

    impl ClockEngine {
        pub fn new(today: BsDate) -> Self {
            ClockEngine {
                today: Cell::new(today),
            }
        }

        pub fn set_today(&self, today: BsDate) {
            self.today.set(today);
        }
    }

    impl DateEngine for ClockEngine {
        fn date(&self, year: i32, month: u32, day: u32) -> Result<BsDate> {
            if month >= 12 || day == 0 || day > 30 {
                return Err(Error::from(ErrorKind::InvalidDate));
            }
            Ok(BsDate::new(year, month, day))
        }

        fn today(&self) -> Result<BsDate> {
            Ok(self.today.get())
        }

        fn weekday(&self, date: &BsDate) -> Result<u32> {
            let days = (date.year() as i64 - 2000) * 360
                + date.month() as i64 * 30
                + date.day() as i64
                - 1;
            Ok(days.rem_euclid(7) as u32)
        }

        fn days_in_month(&self, _year: i32, month: u32) -> Result<u32> {
            if month >= 12 {
                return Err(Error::from(ErrorKind::InvalidDate));
            }
            Ok(30)
        }

        fn add_months(&self, date: &BsDate, months: i32) -> Result<BsDate> {
            let total = date.year() as i64 * 12 + date.month() as i64 + months as i64;
            let year = i32::try_from(total.div_euclid(12))
                .map_err(|_| Error::from(ErrorKind::DateOutOfRange))?;
            Ok(BsDate::new(year, total.rem_euclid(12) as u32, date.day()))
        }

        fn add_years(&self, date: &BsDate, years: i32) -> Result<BsDate> {
            let year = date
                .year()
                .checked_add(years)
                .ok_or_else(|| Error::from(ErrorKind::DateOutOfRange))?;
            Ok(BsDate::new(year, date.month(), date.day()))
        }
    }
}
