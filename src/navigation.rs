use std::fmt;

use crate::engine::{BsDate, DateEngine};
use crate::error::Result;
use crate::grid::{self, MonthGrid};
use crate::locale::{Locale, WeekStart};

/// The (year, month) pair currently on screen. `month` is 0-based and always
/// in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayedMonth {
    year: i32,
    month: u32,
}

impl DisplayedMonth {
    /// Normalizes `month` into `0..12`, carrying the rest into the year.
    pub fn new(year: i32, month: i32) -> Self {
        DisplayedMonth {
            year: year + month.div_euclid(12),
            month: month.rem_euclid(12) as u32,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl From<BsDate> for DisplayedMonth {
    fn from(date: BsDate) -> Self {
        DisplayedMonth::new(date.year(), date.month() as i32)
    }
}

impl fmt::Display for DisplayedMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month + 1)
    }
}

/// Owner of the displayed month. Every transition computes the new month and
/// its grid first and only then replaces both, so a failed transition leaves
/// the previous state untouched.
pub struct NavigationController<E: DateEngine> {
    engine: E,
    locale: Locale,
    week_start: WeekStart,
    displayed: DisplayedMonth,
    grid: MonthGrid,
}

impl<E: DateEngine> NavigationController<E> {
    pub fn new(engine: E, locale: Locale, week_start: WeekStart) -> Result<Self> {
        let today = engine.today()?;
        Self::starting_at(engine, locale, week_start, DisplayedMonth::from(today))
    }

    pub fn starting_at(
        engine: E,
        locale: Locale,
        week_start: WeekStart,
        displayed: DisplayedMonth,
    ) -> Result<Self> {
        let grid = Self::render(&engine, locale, week_start, displayed)?;

        Ok(NavigationController {
            engine,
            locale,
            week_start,
            displayed,
            grid,
        })
    }

    fn render(
        engine: &E,
        locale: Locale,
        week_start: WeekStart,
        displayed: DisplayedMonth,
    ) -> Result<MonthGrid> {
        let today = engine.today()?;
        grid::generate(
            engine,
            displayed.year(),
            displayed.month(),
            locale,
            week_start,
            &today,
        )
    }

    fn commit(&mut self, displayed: DisplayedMonth) -> Result<&MonthGrid> {
        let grid = Self::render(&self.engine, self.locale, self.week_start, displayed)?;

        log::debug!("Showing {} (was {})", displayed, self.displayed);
        self.displayed = displayed;
        self.grid = grid;

        Ok(&self.grid)
    }

    fn first_of_displayed(&self) -> Result<BsDate> {
        self.engine
            .date(self.displayed.year(), self.displayed.month(), 1)
    }

    pub fn step_month(&mut self, delta: i32) -> Result<&MonthGrid> {
        let target = self.engine.add_months(&self.first_of_displayed()?, delta)?;
        self.commit(DisplayedMonth::from(target))
    }

    pub fn step_year(&mut self, delta: i32) -> Result<&MonthGrid> {
        let target = self.engine.add_years(&self.first_of_displayed()?, delta)?;
        self.commit(DisplayedMonth::from(target))
    }

    pub fn go_to_today(&mut self) -> Result<&MonthGrid> {
        let today = self.engine.today()?;
        self.commit(DisplayedMonth::from(today))
    }

    pub fn jump_to(&mut self, displayed: DisplayedMonth) -> Result<&MonthGrid> {
        self.commit(displayed)
    }

    /// Regenerates the current month, picking up a changed "today".
    pub fn refresh(&mut self) -> Result<&MonthGrid> {
        self.commit(self.displayed)
    }

    pub fn displayed(&self) -> DisplayedMonth {
        self.displayed
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
