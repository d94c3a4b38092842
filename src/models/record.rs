use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use super::expense::{Expense, ExpenseDraft};
use super::parse_leading_int;

pub const BUDGET_PER_PERSON: i64 = 50_000;
pub const DEFAULT_TEAM_SIZE: u32 = 7;

/// The persisted state of one month: headcount plus the expenses recorded so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetRecord {
    #[serde(default = "default_team_size", deserialize_with = "team_size_or_default")]
    pub team_size: u32,
    #[serde(default, deserialize_with = "expenses_or_empty")]
    pub expenses: Vec<Expense>,
}

fn default_team_size() -> u32 {
    DEFAULT_TEAM_SIZE
}

fn team_size_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<u32>::deserialize(deserializer)?;
    Ok(raw.filter(|n| *n > 0).unwrap_or(DEFAULT_TEAM_SIZE))
}

fn expenses_or_empty<'de, D>(deserializer: D) -> Result<Vec<Expense>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Expense>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for MonthlyBudgetRecord {
    fn default() -> Self {
        Self {
            team_size: DEFAULT_TEAM_SIZE,
            expenses: Vec::new(),
        }
    }
}

impl MonthlyBudgetRecord {
    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary::of(self)
    }

    /// Append an expense built from `draft`. Returns `None` and leaves the
    /// record untouched when the draft is invalid.
    pub fn add_expense(&mut self, draft: &ExpenseDraft, now: DateTime<Local>) -> Option<&Expense> {
        let amount = draft.parsed_amount()?;
        let id = self.next_expense_id(now.timestamp_millis());
        self.expenses.push(Expense::new(
            id,
            draft.name.clone(),
            amount,
            draft.description.clone(),
            now,
        ));
        self.expenses.last()
    }

    /// Remove the expense with `id`. Returns whether anything was removed.
    pub fn remove_expense(&mut self, id: i64) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        self.expenses.len() != before
    }

    /// Set the team size from raw user input, clamping to at least one person.
    pub fn set_team_size(&mut self, raw: &str) -> u32 {
        self.team_size = parse_team_size(raw);
        self.team_size
    }

    /// Ids follow the clock but always move past the largest existing id. Once
    /// that saturates, the closest free id below it is used instead.
    fn next_expense_id(&self, now_millis: i64) -> i64 {
        let candidate = match self.expenses.iter().map(|e| e.id).max() {
            Some(max) if max >= now_millis => max.saturating_add(1),
            _ => now_millis,
        };
        let taken: HashSet<i64> = self.expenses.iter().map(|e| e.id).collect();
        let mut id = candidate;
        while taken.contains(&id) {
            id = id.wrapping_sub(1);
        }
        id
    }
}

pub(crate) fn parse_team_size(raw: &str) -> u32 {
    parse_leading_int(raw)
        .filter(|n| *n >= 1)
        .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Warning,
    Over,
}

/// Totals derived from a record. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    pub total_budget: i64,
    pub total_spent: i64,
    pub remaining: i64,
    pub usage_percent: f64,
}

impl BudgetSummary {
    pub fn of(record: &MonthlyBudgetRecord) -> Self {
        let total_budget = i64::from(record.team_size) * BUDGET_PER_PERSON;
        let total_spent = record
            .expenses
            .iter()
            .fold(0i64, |sum, e| sum.saturating_add(e.amount));
        let usage_percent = if total_budget > 0 {
            total_spent as f64 / total_budget as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_budget,
            total_spent,
            remaining: total_budget.saturating_sub(total_spent),
            usage_percent,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining < 0
    }

    pub fn usage_level(&self) -> UsageLevel {
        if self.usage_percent > 100.0 {
            UsageLevel::Over
        } else if self.usage_percent > 80.0 {
            UsageLevel::Warning
        } else {
            UsageLevel::Normal
        }
    }

    /// Fraction of the bar to fill, capped at a full bar.
    pub fn bar_ratio(&self) -> f64 {
        (self.usage_percent / 100.0).clamp(0.0, 1.0)
    }
}
