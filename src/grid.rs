//! Month grid generation.
//!
//! [`generate`] turns a displayed month into a header and a list of weeks,
//! every week holding exactly seven cells. The grid is plain data; the
//! terminal and markdown renderings below are built on top of it.

use itertools::Itertools;
use std::fmt;
use std::iter;

use crate::engine::{BsDate, DateEngine};
use crate::error::Result;
use crate::locale::{self, Locale, WeekStart};

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    Empty,
    Day { day: u32, is_today: bool },
}

impl CalendarCell {
    const WIDTH: usize = 2;

    pub fn day(&self) -> Option<u32> {
        match self {
            CalendarCell::Empty => None,
            CalendarCell::Day { day, .. } => Some(*day),
        }
    }

    pub fn is_today(&self) -> bool {
        matches!(self, CalendarCell::Day { is_today: true, .. })
    }

    /// Day number in the locale's numerals, right aligned to a fixed width.
    /// Empty cells are blank of the same width.
    pub fn label(&self, locale: Locale) -> String {
        match self {
            CalendarCell::Empty => " ".repeat(Self::WIDTH),
            CalendarCell::Day { day, .. } => locale::to_localized_digits(
                locale,
                format!("{:>width$}", day, width = Self::WIDTH),
            ),
        }
    }
}

pub type Week = [CalendarCell; DAYS_PER_WEEK];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    year: i32,
    month: u32,
    locale: Locale,
    week_start: WeekStart,
    header: String,
    weekday_labels: [&'static str; DAYS_PER_WEEK],
    weeks: Vec<Week>,
}

impl MonthGrid {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn weekday_labels(&self) -> &[&'static str; DAYS_PER_WEEK] {
        &self.weekday_labels
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    pub fn today(&self) -> Option<u32> {
        self.cells().find(|cell| cell.is_today()).and_then(CalendarCell::day)
    }

    /// Grid as a markdown table, today's day in bold.
    pub fn markdown_table(&self) -> String {
        let mut lines = Vec::with_capacity(self.weeks.len() + 2);

        lines.push(format!("| {} |", self.weekday_labels.iter().join(" | ")));
        lines.push(format!(
            "|{}|",
            iter::repeat(":-:").take(DAYS_PER_WEEK).join("|")
        ));

        for week in &self.weeks {
            let row = week
                .iter()
                .map(|cell| {
                    if cell.is_today() {
                        format!("**{}**", cell.label(self.locale))
                    } else {
                        cell.label(self.locale)
                    }
                })
                .join(" | ");
            lines.push(format!("| {} |", row));
        }

        lines.join("\n")
    }

    /// Header as a heading followed by the table.
    pub fn to_markdown(&self) -> String {
        format!("## {}\n\n{}\n", self.header, self.markdown_table())
    }
}

impl fmt::Display for MonthGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CELL_WIDTH: usize = 5;

        writeln!(f, "{}", self.header)?;
        for label in &self.weekday_labels {
            write!(f, "{:>width$}", label, width = CELL_WIDTH)?;
        }
        writeln!(f)?;

        for week in &self.weeks {
            for cell in week {
                let marker = if cell.is_today() { '*' } else { ' ' };
                write!(
                    f,
                    "{:>width$}{}",
                    cell.label(self.locale),
                    marker,
                    width = CELL_WIDTH - 1
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Number of leading empty cells before day 1, given its weekday
/// (Sunday = 0).
pub fn first_column_offset(first_weekday: u32, week_start: WeekStart) -> u32 {
    match week_start {
        WeekStart::Sunday => first_weekday,
        WeekStart::Monday => (first_weekday + 6) % 7,
    }
}

/// Weekday column labels; a Monday start moves Sunday to the last column.
pub fn weekday_labels(locale: Locale, week_start: WeekStart) -> [&'static str; DAYS_PER_WEEK] {
    let mut labels = locale::lookup(locale).weekday_short_names;
    if week_start == WeekStart::Monday {
        labels.rotate_left(1);
    }
    labels
}

pub fn header(year: i32, month: u32, locale: Locale) -> String {
    format!(
        "{} {}",
        locale::lookup(locale).month_name(month),
        locale::to_localized_digits(locale, year)
    )
}

/// Builds the grid of `month` (0-based) in `year`.
///
/// `today` only decides which cell gets highlighted. Errors of the engine are
/// passed through unchanged.
///
/// # Panics
///
/// If `month` is not in `0..12`.
pub fn generate<E: DateEngine + ?Sized>(
    engine: &E,
    year: i32,
    month: u32,
    locale: Locale,
    week_start: WeekStart,
    today: &BsDate,
) -> Result<MonthGrid> {
    assert!(month < 12, "month index {} out of range 0..12", month);

    let num_days = engine.days_in_month(year, month)?;
    let first_weekday = engine.weekday(&engine.date(year, month, 1)?)?;
    let offset = first_column_offset(first_weekday, week_start) as usize;

    let shows_today = today.year() == year && today.month() == month;

    let cells: Vec<CalendarCell> = iter::repeat(CalendarCell::Empty)
        .take(offset)
        .chain((1..=num_days).map(|day| CalendarCell::Day {
            day,
            is_today: shows_today && day == today.day(),
        }))
        .collect();

    let weeks = cells
        .chunks(DAYS_PER_WEEK)
        .map(|chunk| {
            let mut week = [CalendarCell::Empty; DAYS_PER_WEEK];
            week[..chunk.len()].copy_from_slice(chunk);
            week
        })
        .collect();

    Ok(MonthGrid {
        year,
        month,
        locale,
        week_start,
        header: header(year, month, locale),
        weekday_labels: weekday_labels(locale, week_start),
        weeks,
    })
}
