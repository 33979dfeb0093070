//! Calendar month labels used by the monthly breakdown.

use std::fmt;

use serde::{Deserialize, Serialize};

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ITALIAN_MONTHS: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MonthLanguage {
    #[default]
    English,
    Italian,
}

impl MonthLanguage {
    /// Picks a language from a BCP 47 style tag such as `it-IT` or `en-US`.
    pub fn from_locale(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "it" => MonthLanguage::Italian,
            _ => MonthLanguage::English,
        }
    }

    /// Name of the 1-based `month`, or an empty string when out of range.
    pub fn month_name(self, month: u32) -> &'static str {
        let table = match self {
            MonthLanguage::English => &ENGLISH_MONTHS,
            MonthLanguage::Italian => &ITALIAN_MONTHS,
        };
        month
            .checked_sub(1)
            .and_then(|idx| table.get(idx as usize))
            .copied()
            .unwrap_or("")
    }
}

impl fmt::Display for MonthLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MonthLanguage::English => "english",
            MonthLanguage::Italian => "italian",
        };
        f.write_str(label)
    }
}
