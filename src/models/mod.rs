mod expense;
mod month;
mod record;

pub use expense::{parse_leading_int, Expense, ExpenseDraft};
pub use month::{Month, MonthParseError};
pub use record::{
    BudgetSummary, MonthlyBudgetRecord, UsageLevel, BUDGET_PER_PERSON, DEFAULT_TEAM_SIZE,
};
