//! Static localization tables for month names, weekday labels, action
//! labels and numerals.

use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Locale {
    En,
    Np,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::En
    }
}

impl FromStr for Locale {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "np" | "ne" => Ok(Locale::Np),
            _ => Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("Language '{}' not supported (expected 'en' or 'np')", s),
            )),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Np => write!(f, "np"),
        }
    }
}

/// First column of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart::Sunday
    }
}

impl TryFrom<u8> for WeekStart {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WeekStart::Sunday),
            1 => Ok(WeekStart::Monday),
            _ => Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("Week start '{}' not supported (expected 0 or 1)", value),
            )),
        }
    }
}

impl FromStr for WeekStart {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "sun" | "sunday" => Ok(WeekStart::Sunday),
            "1" | "mon" | "monday" => Ok(WeekStart::Monday),
            _ => Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("Week start '{}' not supported", s),
            )),
        }
    }
}

pub struct LocalizationEntry {
    pub month_names: [&'static str; 12],
    /// Indexed Sunday = 0 .. Saturday = 6.
    pub weekday_short_names: [&'static str; 7],
    pub action_labels: &'static phf::Map<&'static str, &'static str>,
    pub digits: Option<[char; 10]>,
}

impl LocalizationEntry {
    pub fn month_name(&self, month: u32) -> &'static str {
        self.month_names[month as usize]
    }

    pub fn action_label(&self, action_id: &str) -> Option<&'static str> {
        self.action_labels.get(action_id).copied()
    }
}

static EN_ACTION_LABELS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "go-to-today" => "Go to Today",
    "copy-to-clipboard" => "Copy to Clipboard",
    "previous-month" => "Previous Month",
    "next-month" => "Next Month",
    "previous-year" => "Previous Year",
    "next-year" => "Next Year",
    "open-preferences" => "Open Preferences",
};

static NP_ACTION_LABELS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "go-to-today" => "आज",
    "copy-to-clipboard" => "प्रतिलिपि गर्नुहोस्",
    "previous-month" => "अघिल्लो महिना",
    "next-month" => "अर्को महिना",
    "previous-year" => "अघिल्लो वर्ष",
    "next-year" => "अर्को वर्ष",
    "open-preferences" => "प्राथमिकताहरू",
};

static EN: LocalizationEntry = LocalizationEntry {
    month_names: [
        "Baisakh", "Jestha", "Asar", "Shrawan", "Bhadra", "Asoj", "Kartik", "Mangsir", "Poush",
        "Magh", "Falgun", "Chaitra",
    ],
    weekday_short_names: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    action_labels: &EN_ACTION_LABELS,
    digits: None,
};

static NP: LocalizationEntry = LocalizationEntry {
    month_names: [
        "बैशाख", "जेठ", "असार", "साउन", "भदौ", "असोज", "कात्तिक", "मंसिर", "पुस", "माघ",
        "फागुन", "चैत",
    ],
    weekday_short_names: ["आइत", "सोम", "मंगल", "बुध", "बिहि", "शुक्र", "शनि"],
    action_labels: &NP_ACTION_LABELS,
    digits: Some(['०', '१', '२', '३', '४', '५', '६', '७', '८', '९']),
};

pub fn lookup(locale: Locale) -> &'static LocalizationEntry {
    match locale {
        Locale::En => &EN,
        Locale::Np => &NP,
    }
}

/// Renders `value` and swaps ASCII digits for the locale's glyphs. Every
/// other character is kept as is.
pub fn to_localized_digits(locale: Locale, value: impl fmt::Display) -> String {
    let plain = value.to_string();

    match lookup(locale).digits {
        Some(glyphs) => plain
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) if c.is_ascii_digit() => glyphs[d as usize],
                _ => c,
            })
            .collect(),
        None => plain,
    }
}
