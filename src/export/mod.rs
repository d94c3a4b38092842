use anyhow::{Context, Result};
use std::path::Path;

use crate::models::MonthlyBudgetRecord;

const HEADER: [&str; 5] = ["id", "date", "name", "amount", "description"];

/// Write the month's expenses to `path` as CSV, in display order.
/// Returns the number of expense rows written.
pub(crate) fn export_month(record: &MonthlyBudgetRecord, path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(HEADER)?;
    for expense in &record.expenses {
        wtr.write_record([
            expense.id.to_string(),
            expense.date.clone(),
            expense.name.clone(),
            expense.amount.to_string(),
            expense.description.clone(),
        ])?;
    }
    wtr.flush().context("Failed to write CSV")?;
    Ok(record.expenses.len())
}

/// Expand a leading `~/` to the user's home directory.
pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = directories::UserDirs::new()
            .map(|d| d.home_dir().display().to_string())
            .unwrap_or_else(|| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

/// Default export location for a month when no path is given.
pub(crate) fn default_path(month: &str) -> String {
    let home = directories::UserDirs::new()
        .map(|d| d.home_dir().display().to_string())
        .unwrap_or_else(|| ".".into());
    format!("{home}/teambudget-{month}.csv")
}
