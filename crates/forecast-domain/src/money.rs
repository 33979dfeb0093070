//! Currency rendering for summary sheets, console tables and chart labels.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn symbol(&self) -> String {
        symbol_for(self.as_str())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("EUR")
    }
}

/// Separators used when printing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        "CHF" => "CHF ".into(),
        _ => format!("{} ", code),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(format: &NumberFormat, value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };
    let grouped = group_signed(int_part, format.grouping_separator);
    match frac_part {
        Some(frac) => format!("{}{}{}", grouped, format.decimal_separator, frac),
        None => grouped,
    }
}

fn group_signed(int_part: &str, separator: char) -> String {
    match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, separator)),
        None => group_digits(int_part, separator),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders `amount` as `€1,234.56` (sign before the symbol when negative).
pub fn format_currency(amount: f64, code: &CurrencyCode, format: &NumberFormat) -> String {
    let precision = minor_units_for(code.as_str());
    let body = format_number(format, amount.abs(), precision);
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, code.symbol(), body)
}

/// Short label in thousands, e.g. `€12.3k`, used above chart bars.
pub fn format_thousands(amount: f64, code: &CurrencyCode) -> String {
    format!("{}{:.1}k", code.symbol(), amount / 1000.0)
}
