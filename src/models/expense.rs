use chrono::{DateTime, Datelike, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LEADING_INT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[ \t\r\n]*([+-]?[0-9]+)").ok());

/// Parse the leading integer of `raw`, ignoring anything after the digits.
/// `"42000원"` → `Some(42000)`, `" 3.7"` → `Some(3)`, `"abc"` → `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let re = LEADING_INT.as_ref()?;
    let caps = re.captures(raw)?;
    caps.get(1)?.as_str().parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

impl Expense {
    pub fn new(
        id: i64,
        name: String,
        amount: i64,
        description: String,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            name,
            amount,
            description,
            date: localized_date(now),
        }
    }
}

/// Short Korean-locale date, e.g. `2026. 1. 5.`
pub(crate) fn localized_date(now: DateTime<Local>) -> String {
    format!("{}. {}. {}.", now.year(), now.month(), now.day())
}

/// Raw text of the expense entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: String,
    pub description: String,
}

impl ExpenseDraft {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            description: description.into(),
        }
    }

    /// Returns the validated amount, or `None` when the draft must be ignored.
    pub fn parsed_amount(&self) -> Option<i64> {
        if self.name.trim().is_empty() {
            return None;
        }
        parse_leading_int(&self.amount).filter(|amount| *amount >= 0)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.amount.is_empty() && self.description.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
