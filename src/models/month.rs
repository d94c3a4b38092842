use chrono::{Datelike, Local, Months, NaiveDate};
use std::str::FromStr;

/// A calendar month, always stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(pub String);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self(today.with_day(1).unwrap_or(today))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Key under which this month's record lives in the key-value store.
    pub fn storage_key(&self) -> String {
        format!("budget-{self}")
    }

    pub fn next(&self) -> Self {
        self.0.checked_add_months(Months::new(1)).map_or(*self, Self)
    }

    pub fn prev(&self) -> Self {
        self.0.checked_sub_months(Months::new(1)).map_or(*self, Self)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthParseError(s.to_string()))?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        let well_formed =
            year.len() == 4 && (1..=2).contains(&month.len()) && digits(year) && digits(month);
        if !well_formed {
            return Err(MonthParseError(s.to_string()));
        }
        let year: i32 = year.parse().map_err(|_| MonthParseError(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| MonthParseError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| MonthParseError(s.to_string()))
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}
