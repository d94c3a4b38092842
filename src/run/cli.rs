use anyhow::Result;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::models::{Month, BUDGET_PER_PERSON};
use crate::tracker::BudgetTracker;
use crate::ui::util::format_won;

pub(crate) fn as_cli(args: &[String], tracker: &mut BudgetTracker, rt: &Runtime) -> Result<()> {
    match args[0].as_str() {
        "summary" | "s" => cli_summary(&args[1..], tracker, rt),
        "export" => cli_export(&args[1..], tracker, rt),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("teambudget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("TeamBudget - shared monthly team expense tracker");
    println!();
    println!("Usage: teambudget [options] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  summary [YYYY-MM]             Print the month's budget summary");
    println!("  export [path]                 Export the month's expenses to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Options:");
    println!("  --db <path>                   Use this database file");
    println!("  --memory                      Keep data in memory only");
    println!("  --month <YYYY-MM>             Month to open, summarize or export");
}

/// Switch to `month` when given and block until its record is loaded.
fn load_month(tracker: &mut BudgetTracker, rt: &Runtime, month: Option<Month>) -> Result<()> {
    if let Some(month) = month {
        if month != tracker.month() {
            tracker.set_month(month)?;
        }
    }
    rt.block_on(tracker.wait_ready())?;
    Ok(())
}

fn cli_summary(args: &[String], tracker: &mut BudgetTracker, rt: &Runtime) -> Result<()> {
    let month = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| a.parse::<Month>())
        .transpose()?;
    load_month(tracker, rt, month)?;

    let record = tracker.record();
    let summary = tracker.summary();
    let status = if summary.is_over_budget() {
        "Over budget"
    } else {
        "Remaining"
    };

    println!("TeamBudget - {}", tracker.month());
    println!("{}", "─".repeat(40));
    println!(
        "  Team:       {} × {}",
        record.team_size,
        format_won(BUDGET_PER_PERSON)
    );
    println!("  Budget:     {}", format_won(summary.total_budget));
    println!("  Spent:      {}", format_won(summary.total_spent));
    println!("  {status:<11} {}", format_won(summary.remaining.saturating_abs()));
    println!("  Usage:      {:.1}%", summary.usage_percent);

    if !record.expenses.is_empty() {
        println!();
        println!("Expenses:");
        for expense in &record.expenses {
            println!(
                "  {:<14} {:<16} {:>12}  {}",
                expense.date,
                expense.name,
                format_won(expense.amount),
                expense.description
            );
        }
    }

    Ok(())
}

fn cli_export(args: &[String], tracker: &mut BudgetTracker, rt: &Runtime) -> Result<()> {
    // `--month` has already been applied as the start month
    load_month(tracker, rt, None)?;

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| crate::export::shellexpand(a))
        .unwrap_or_else(|| crate::export::default_path(&tracker.month().to_string()));

    let count = crate::export::export_month(tracker.record(), Path::new(&output_path))?;
    if count == 0 {
        println!("No expenses for {}", tracker.month());
    } else {
        println!("Exported {count} expenses to {output_path}");
    }
    Ok(())
}
