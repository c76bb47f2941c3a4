//! Year ranges used to bound the analysis, and the configurable window they are resolved from.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static YEAR_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").expect("static regex is valid"));

/// An inclusive range of calendar years.
///
/// # Examples
///
/// ```
/// use precip_trend::YearRange;
///
/// let window = YearRange::new(2018, 2023);
/// assert!(window.contains(2018));
/// assert!(window.contains(2023));
/// assert!(!window.contains(2024));
/// assert_eq!(window.years().count(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    /// First year in the range (inclusive).
    pub start: i32,
    /// Last year in the range (inclusive).
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Iterates every year of the range in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Cheap textual pre-check used by stores to skip records outside the range
    /// without parsing the date.
    ///
    /// The first standalone four-digit group in `date_text` is taken as the year.
    /// Text without such a group is kept (`true`) so the cleaner can make the
    /// final call; this is an optimisation, never the source of truth.
    pub fn may_contain_date_text(&self, date_text: &str) -> bool {
        YEAR_IN_TEXT
            .captures(date_text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .map_or(true, |year| self.contains(year))
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", self.start, self.end)
    }
}

/// The year window a pipeline run restricts its records to.
///
/// In a TOML configuration this is written as `year_window = { trailing = 5 }`
/// or `year_window = { fixed = { start = 2018, end = 2023 } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearWindow {
    /// The last `n` years counted back from the reference year, open towards the
    /// present: a reference year of 2025 with `Trailing(5)` keeps 2020 through 2025.
    Trailing(u32),
    /// An explicit inclusive range.
    Fixed(YearRange),
}

impl YearWindow {
    /// Resolves the window to concrete years, given the current (reference) year.
    pub fn resolve(&self, reference_year: i32) -> YearRange {
        match *self {
            YearWindow::Trailing(years) => {
                let span = i32::try_from(years).unwrap_or(i32::MAX);
                YearRange::new(reference_year.saturating_sub(span), reference_year)
            }
            YearWindow::Fixed(range) => range,
        }
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearWindow::Trailing(years) => write!(f, "last {} years", years),
            YearWindow::Fixed(range) => write!(f, "{}", range),
        }
    }
}
