//! Parsing dates out of selected invoice text.
//!
//! A fixed, ordered list of patterns is tried against the trimmed input. The
//! first pattern whose regex matches decides the outcome: if the captured
//! parts do not form a real calendar date the parse fails, and later patterns
//! are not consulted.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// How to read the two leading numbers of a `N/N/YYYY` or `N/N/YY` date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericDateOrder {
    /// `M/D/YYYY` (default).
    #[default]
    MonthFirst,
    /// `D/M/YYYY`.
    DayFirst,
}

/// The host form's date display convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateDisplayFormat {
    /// `M/D/YYYY`, e.g. `12/31/2024` (default).
    #[default]
    MonthDayYear,
    /// `D/M/YYYY`, e.g. `31/12/2024`.
    DayMonthYear,
    /// `YYYY-MM-DD`, e.g. `2024-12-31`.
    Iso,
    /// `D-Mon-YYYY`, e.g. `31-Dec-2024`.
    DayMonAbbrevYear,
}

impl DateDisplayFormat {
    pub fn format(self, date: NaiveDate) -> String {
        let (y, m, d) = (date.year(), date.month(), date.day());
        match self {
            DateDisplayFormat::MonthDayYear => format!("{m}/{d}/{y}"),
            DateDisplayFormat::DayMonthYear => format!("{d}/{m}/{y}"),
            DateDisplayFormat::Iso => date.format("%Y-%m-%d").to_string(),
            DateDisplayFormat::DayMonAbbrevYear => format!("{d}-{}-{y}", date.format("%b")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    NumericSlash,
    NumericSlashShortYear,
    DayMonthYearNumeric,
    DayNamedMonthYear,
    YearMonthDay,
}

struct DatePattern {
    regex: Regex,
    layout: Layout,
}

fn pattern(source: &str, layout: Layout) -> Option<DatePattern> {
    Regex::new(source).ok().map(|regex| DatePattern { regex, layout })
}

static PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    [
        (r"^(\d{1,2})/(\d{1,2})/(\d{4})$", Layout::NumericSlash),
        (r"^(\d{1,2})/(\d{1,2})/(\d{2})$", Layout::NumericSlashShortYear),
        (r"^(\d{1,2})-([A-Za-z]{3})-(\d{4})$", Layout::DayNamedMonthYear),
        (r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$", Layout::DayMonthYearNumeric),
        (r"^(\d{1,2})-([A-Za-z]+)-(\d{4})$", Layout::DayNamedMonthYear),
        (r"^(\d{1,2}) ([A-Za-z]+), (\d{4})$", Layout::DayNamedMonthYear),
        (r"^(\d{4})/(\d{1,2})/(\d{1,2})$", Layout::YearMonthDay),
        (r"^(\d{4})-(\d{1,2})-(\d{1,2})$", Layout::YearMonthDay),
        (r"^(\d{1,2}) ([A-Za-z]+) (\d{4})$", Layout::DayNamedMonthYear),
    ]
    .into_iter()
    .filter_map(|(source, layout)| pattern(source, layout))
    .collect()
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Resolve a month name or abbreviation (case-insensitive) to `1..=12`.
///
/// Accepts full names, three-letter abbreviations and `Sept`.
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|full| *full == lower || (lower.len() == 3 && full.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// Parse `text` as a date, or return `None`.
pub fn parse_date(text: &str, order: NumericDateOrder) -> Option<NaiveDate> {
    let text = text.trim();
    let (pattern, caps) = PATTERNS
        .iter()
        .find_map(|p| p.regex.captures(text).map(|c| (p, c)))?;

    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());

    let (y, m, d) = match pattern.layout {
        Layout::NumericSlash | Layout::NumericSlashShortYear => {
            let (a, b) = (num(1)?, num(2)?);
            let (m, d) = match order {
                NumericDateOrder::MonthFirst => (a, b),
                NumericDateOrder::DayFirst => (b, a),
            };
            let y = year(3)?;
            let y = match pattern.layout {
                Layout::NumericSlashShortYear => 2000 + y,
                _ => y,
            };
            (y, m, d)
        }
        Layout::DayMonthYearNumeric => (year(3)?, num(2)?, num(1)?),
        Layout::DayNamedMonthYear => {
            let month = month_from_name(caps.get(2)?.as_str())?;
            (year(3)?, month, num(1)?)
        }
        Layout::YearMonthDay => (year(1)?, num(2)?, num(3)?),
    };

    NaiveDate::from_ymd_opt(y, m, d)
}
