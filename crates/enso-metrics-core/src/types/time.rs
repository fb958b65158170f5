//! Calendar helpers for monthly time axes.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sampling frequency of the input fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Number of samples per calendar year.
    pub fn steps_per_year(&self) -> usize {
        match self {
            Self::Monthly => 12,
            Self::Yearly => 1,
        }
    }
}

/// Trend removal applied before anomalies are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detrending {
    None,
    #[default]
    Linear,
}

/// Inclusive date range used to restrict model or observation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Number of calendar months touched by the window.
    pub fn months(&self) -> i64 {
        months_between(self.start, self.end) + 1
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Three-month seasons used by seasonal statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Djf,
    Mam,
    Jja,
    Son,
    Ndj,
}

impl Season {
    pub fn all() -> [Season; 5] {
        [Self::Djf, Self::Mam, Self::Jja, Self::Son, Self::Ndj]
    }

    /// Calendar month (1-12) the season starts in.
    pub fn first_month(&self) -> u32 {
        match self {
            Self::Djf => 12,
            Self::Mam => 3,
            Self::Jja => 6,
            Self::Son => 9,
            Self::Ndj => 11,
        }
    }

    /// Whether the season straddles the turn of the year.
    pub fn crosses_year(&self) -> bool {
        self.first_month() > 10
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Djf => "DJF",
            Self::Mam => "MAM",
            Self::Jja => "JJA",
            Self::Son => "SON",
            Self::Ndj => "NDJ",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole months from `from` to `to` (negative when `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

/// `date` shifted forward by `months`, pinned to the first of the month.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let start = month_start(date);
    start.checked_add_months(Months::new(months)).unwrap_or(start)
}
