//! Display language and the handful of localized strings the core needs.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "cs")]
    Czech,
    #[serde(rename = "de")]
    German,
}

const MONTHS_EN: [&str; 12] = [
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

// Genitive forms, as used after a day number.
const MONTHS_CS: [&str; 12] = [
    "ledna", "února", "března", "dubna", "května", "června", "července", "srpna", "září", "října",
    "listopadu", "prosince",
];

const MONTHS_DE: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Czech => "cs",
            Language::German => "de",
        }
    }

    /// Month name for a 1-based month. Out-of-range months yield "?".
    pub fn month_name(&self, month: u32) -> &'static str {
        let table = match self {
            Language::English => &MONTHS_EN,
            Language::Czech => &MONTHS_CS,
            Language::German => &MONTHS_DE,
        };
        month
            .checked_sub(1)
            .and_then(|i| table.get(i as usize))
            .copied()
            .unwrap_or("?")
    }

    /// "today", "tomorrow", "in 5 days" and their translations.
    pub fn relative_days(&self, days: i64) -> String {
        match (self, days) {
            (Language::English, 0) => "today".to_string(),
            (Language::English, 1) => "tomorrow".to_string(),
            (Language::English, n) => format!("in {n} days"),
            (Language::Czech, 0) => "dnes".to_string(),
            (Language::Czech, 1) => "zítra".to_string(),
            (Language::Czech, n @ 2..=4) => format!("za {n} dny"),
            (Language::Czech, n) => format!("za {n} dní"),
            (Language::German, 0) => "heute".to_string(),
            (Language::German, 1) => "morgen".to_string(),
            (Language::German, n) => format!("in {n} Tagen"),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(Language::English.month_name(1), "January");
        assert_eq!(Language::German.month_name(12), "Dezember");
        assert_eq!(Language::Czech.month_name(7), "července");
        assert_eq!(Language::English.month_name(0), "?");
        assert_eq!(Language::English.month_name(13), "?");
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(Language::English.relative_days(0), "today");
        assert_eq!(Language::English.relative_days(7), "in 7 days");
        assert_eq!(Language::Czech.relative_days(3), "za 3 dny");
        assert_eq!(Language::Czech.relative_days(10), "za 10 dní");
        assert_eq!(Language::German.relative_days(1), "morgen");
    }
}
