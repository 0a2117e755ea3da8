use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{BsDate, DateEngine};
use crate::error::{Error, ErrorKind, Result};

const MIN_MONTH_LENGTH: u8 = 29;
const MAX_MONTH_LENGTH: u8 = 32;

const ANCHOR_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct CalendarData {
    anchor: String,
    #[serde(rename = "year")]
    years: Vec<YearData>,
}

#[derive(Debug, Deserialize)]
struct YearData {
    year: i32,
    months: Vec<u8>,
}

/// Month-length table anchored at the Gregorian date of Baisakh 1 of its
/// first year.
#[derive(Debug, Clone)]
pub struct TableEngine {
    anchor: NaiveDate,
    first_year: i32,
    months: Vec<[u8; 12]>,
    fixed_today: Option<NaiveDate>,
}

impl TableEngine {
    pub fn new(anchor: NaiveDate, first_year: i32, months: Vec<[u8; 12]>) -> Result<Self> {
        if months.is_empty() {
            return Err(Error::new(
                ErrorKind::CalendarData,
                "calendar data does not contain any year",
            ));
        }

        for (idx, year) in months.iter().enumerate() {
            if let Some(len) = year
                .iter()
                .find(|&&len| !(MIN_MONTH_LENGTH..=MAX_MONTH_LENGTH).contains(&len))
            {
                return Err(Error::new(
                    ErrorKind::CalendarData,
                    &format!(
                        "year {} has a month of {} days",
                        first_year + idx as i32,
                        len
                    ),
                ));
            }
        }

        Ok(TableEngine {
            anchor,
            first_year,
            months,
            fixed_today: None,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let data: CalendarData = toml::from_str(content)?;
        let anchor = NaiveDate::parse_from_str(&data.anchor, ANCHOR_DATE_FORMAT)?;

        let first_year = match data.years.first() {
            Some(year) => year.year,
            None => {
                return Err(Error::new(
                    ErrorKind::CalendarData,
                    "calendar data does not contain any year",
                ))
            }
        };

        let mut months = Vec::with_capacity(data.years.len());
        for (idx, year) in data.years.iter().enumerate() {
            if year.year != first_year + idx as i32 {
                return Err(Error::new(
                    ErrorKind::CalendarData,
                    &format!(
                        "years must be consecutive, found {} after {}",
                        year.year,
                        first_year + idx as i32 - 1
                    ),
                ));
            }

            let lengths: [u8; 12] = year.months.as_slice().try_into().map_err(|_| {
                Error::new(
                    ErrorKind::CalendarData,
                    &format!(
                        "year {} lists {} months instead of 12",
                        year.year,
                        year.months.len()
                    ),
                )
            })?;
            months.push(lengths);
        }

        TableEngine::new(anchor, first_year, months)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::from(err).with_msg(&format!("could not read '{}'", path.display()))
        })?;

        let engine = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded calendar data for {}..={} from '{}'",
            engine.first_year,
            engine.last_year(),
            path.display()
        );

        Ok(engine)
    }

    /// Pins "today" to a Gregorian date instead of the local clock.
    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.first_year + self.months.len() as i32 - 1
    }

    fn year_table(&self, year: i32) -> Result<&[u8; 12]> {
        if year < self.first_year || year > self.last_year() {
            return Err(Error::new(
                ErrorKind::DateOutOfRange,
                &format!(
                    "year {} is not covered ({}..={})",
                    year,
                    self.first_year,
                    self.last_year()
                ),
            ));
        }

        Ok(&self.months[(year - self.first_year) as usize])
    }

    /// Days elapsed since the anchor.
    fn days_since_anchor(&self, date: &BsDate) -> Result<i64> {
        let year_table = self.year_table(date.year())?;

        let full_years: i64 = self.months[..(date.year() - self.first_year) as usize]
            .iter()
            .flat_map(|year| year.iter())
            .map(|&len| len as i64)
            .sum();

        let full_months: i64 = year_table[..date.month() as usize]
            .iter()
            .map(|&len| len as i64)
            .sum();

        Ok(full_years + full_months + date.day() as i64 - 1)
    }

    pub fn to_gregorian(&self, date: &BsDate) -> Result<NaiveDate> {
        let days = self.days_since_anchor(date)?;
        Ok(self.anchor + Duration::days(days))
    }

    pub fn to_bs_date(&self, date: NaiveDate) -> Result<BsDate> {
        let mut remaining = date.signed_duration_since(self.anchor).num_days();
        let out_of_range = || {
            Error::new(
                ErrorKind::DateOutOfRange,
                &format!("{} is not covered by the calendar data", date),
            )
        };

        if remaining < 0 {
            return Err(out_of_range());
        }

        for (year_idx, year) in self.months.iter().enumerate() {
            for (month_idx, &len) in year.iter().enumerate() {
                if remaining < len as i64 {
                    return Ok(BsDate::new(
                        self.first_year + year_idx as i32,
                        month_idx as u32,
                        remaining as u32 + 1,
                    ));
                }
                remaining -= len as i64;
            }
        }

        Err(out_of_range())
    }

    fn clamped(&self, year: i32, month: u32, day: u32) -> Result<BsDate> {
        let max_day = self.days_in_month(year, month)?;
        Ok(BsDate::new(year, month, day.min(max_day)))
    }
}

impl DateEngine for TableEngine {
    fn date(&self, year: i32, month: u32, day: u32) -> Result<BsDate> {
        if month >= 12 {
            return Err(Error::new(
                ErrorKind::InvalidDate,
                &format!("month {} is not in 0..12", month),
            ));
        }

        let max_day = self.days_in_month(year, month)?;
        if day == 0 || day > max_day {
            return Err(Error::new(
                ErrorKind::InvalidDate,
                &format!("day {} is not in 1..={}", day, max_day),
            ));
        }

        Ok(BsDate::new(year, month, day))
    }

    fn today(&self) -> Result<BsDate> {
        let today = self
            .fixed_today
            .unwrap_or_else(|| Local::now().date_naive());

        self.to_bs_date(today)
    }

    fn weekday(&self, date: &BsDate) -> Result<u32> {
        Ok(self.to_gregorian(date)?.weekday().num_days_from_sunday())
    }

    fn days_in_month(&self, year: i32, month: u32) -> Result<u32> {
        let table = self.year_table(year)?;
        table.get(month as usize).map(|&len| len as u32).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidDate,
                &format!("month {} is not in 0..12", month),
            )
        })
    }

    fn add_months(&self, date: &BsDate, months: i32) -> Result<BsDate> {
        let total = (date.month() as i32)
            .checked_add(months)
            .ok_or_else(|| overflow(date, months, "months"))?;
        let year = date
            .year()
            .checked_add(total.div_euclid(12))
            .ok_or_else(|| overflow(date, months, "months"))?;
        let month = total.rem_euclid(12) as u32;

        self.clamped(year, month, date.day())
    }

    fn add_years(&self, date: &BsDate, years: i32) -> Result<BsDate> {
        let year = date
            .year()
            .checked_add(years)
            .ok_or_else(|| overflow(date, years, "years"))?;

        self.clamped(year, date.month(), date.day())
    }
}

fn overflow(date: &BsDate, delta: i32, unit: &str) -> Error {
    Error::new(
        ErrorKind::DateOutOfRange,
        &format!("{} {:+} {} is not representable", date, delta, unit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixture;
    use std::io::Write;

    const DATA: &str = r#"
anchor = "2024-04-13"

[[year]]
year = 2081
months = [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 29, 31]

[[year]]
year = 2082
months = [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30]
"#;

    #[test]
    fn parse_calendar_data() {
        let engine = TableEngine::from_toml_str(DATA).unwrap();

        assert_eq!(engine.first_year(), 2081);
        assert_eq!(engine.last_year(), 2082);
        assert_eq!(engine.days_in_month(2082, 1).unwrap(), 32);
    }

    #[test]
    fn load_calendar_data_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();

        let engine = TableEngine::from_file(file.path()).unwrap();
        assert_eq!(engine.days_in_month(2081, 11).unwrap(), 31);
    }

    #[test]
    fn reject_broken_calendar_data() {
        let gap = DATA.replace("year = 2082", "year = 2083");
        assert!(TableEngine::from_toml_str(&gap).is_err());

        let short = DATA.replace("29, 29, 30, 30]", "29, 29, 30]");
        assert!(TableEngine::from_toml_str(&short).is_err());

        let too_long = DATA.replace("[31, 32, 31,", "[31, 33, 31,");
        assert!(TableEngine::from_toml_str(&too_long).is_err());

        let bad_anchor = DATA.replace("2024-04-13", "13.04.2024");
        assert!(matches!(
            TableEngine::from_toml_str(&bad_anchor).unwrap_err().kind,
            ErrorKind::DateParse
        ));
    }

    #[test]
    fn gregorian_conversion() {
        let engine = fixture::engine();

        let new_year = engine
            .to_bs_date(NaiveDate::from_ymd_opt(2025, 4, 14).unwrap())
            .unwrap();
        assert_eq!(new_year, BsDate::new(2082, 0, 1));

        let jestha = engine
            .to_bs_date(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap())
            .unwrap();
        assert_eq!(jestha, BsDate::new(2082, 1, 6));

        assert_eq!(
            engine.to_gregorian(&jestha).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
        );

        assert!(engine
            .to_bs_date(NaiveDate::from_ymd_opt(2024, 4, 12).unwrap())
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn weekdays() {
        let engine = fixture::engine();

        // Saturday
        assert_eq!(engine.weekday(&BsDate::new(2081, 0, 1)).unwrap(), 6);
        // Monday
        assert_eq!(engine.weekday(&BsDate::new(2082, 0, 1)).unwrap(), 1);
        // Thursday
        assert_eq!(engine.weekday(&BsDate::new(2082, 1, 1)).unwrap(), 4);
    }

    #[test]
    fn month_and_year_arithmetic() {
        let engine = fixture::engine();
        let date = BsDate::new(2082, 0, 1);

        assert_eq!(
            engine.add_months(&date, -1).unwrap(),
            BsDate::new(2081, 11, 1)
        );
        assert_eq!(
            engine.add_months(&BsDate::new(2081, 11, 1), 1).unwrap(),
            BsDate::new(2082, 0, 1)
        );
        assert_eq!(
            engine.add_months(&date, 14).unwrap(),
            BsDate::new(2083, 2, 1)
        );
        assert_eq!(engine.add_years(&date, 1).unwrap(), BsDate::new(2083, 0, 1));
        assert!(engine.add_years(&date, 2).unwrap_err().is_out_of_range());

        // Jestha 32 clamps to the 31 days of Asar.
        assert_eq!(
            engine.add_months(&BsDate::new(2082, 1, 32), 1).unwrap(),
            BsDate::new(2082, 2, 31)
        );
    }

    #[test]
    fn huge_offsets_are_out_of_range() {
        let engine = fixture::engine();
        let date = BsDate::new(2082, 11, 1);

        assert!(engine.add_years(&date, i32::MAX).unwrap_err().is_out_of_range());
        assert!(engine.add_years(&date, i32::MIN).unwrap_err().is_out_of_range());
        assert!(engine.add_months(&date, i32::MAX).unwrap_err().is_out_of_range());
        assert!(engine
            .add_months(&BsDate::new(2082, 0, 1), i32::MIN)
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn validated_dates() {
        let engine = fixture::engine();

        assert!(engine.date(2082, 1, 32).is_ok());
        assert!(matches!(
            engine.date(2082, 2, 32).unwrap_err().kind,
            ErrorKind::InvalidDate
        ));
        assert!(engine.date(2082, 12, 1).is_err());
        assert!(engine.date(2090, 0, 1).unwrap_err().is_out_of_range());
    }

    #[test]
    fn pinned_today() {
        let engine = fixture::engine_at(2025, 5, 20);
        assert_eq!(engine.today().unwrap(), BsDate::new(2082, 1, 6));
    }
}
