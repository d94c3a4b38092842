use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction};
use crate::models::{ExpenseDraft, Month};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit TeamBudget", cmd_quit, r);
    register_command!("quit", "Quit TeamBudget", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2026-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2026-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!("team", "Set team size (e.g. :team 7)", cmd_team, r);
    register_command!("t", "Set team size (e.g. :t 7)", cmd_team, r);
    register_command!(
        "add",
        "Add expense (e.g. :add Kim 42000 team lunch)",
        cmd_add,
        r
    );
    register_command!("a", "Add expense (e.g. :a Kim 42000)", cmd_add, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/jan.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App) -> anyhow::Result<()> {
    // Accept "2026-01", "2026-1", or a bare month number within the current year
    let input = if !args.is_empty() && args.len() <= 2 {
        format!("{}-{args:0>2}", app.tracker.month().year())
    } else {
        args.to_string()
    };

    match input.parse::<Month>() {
        Ok(month) => {
            app.tracker.set_month(month)?;
            app.set_status(format!("Switched to month: {month}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.tracker.next_month()?;
    let month = app.tracker.month();
    app.set_status(format!("Switched to month: {month}"));
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App) -> anyhow::Result<()> {
    app.tracker.prev_month()?;
    let month = app.tracker.month();
    app.set_status(format!("Switched to month: {month}"));
    Ok(())
}

fn cmd_team(args: &str, app: &mut App) -> anyhow::Result<()> {
    let result = app.tracker.set_team_size(args);
    if let Some(size) = app.report(result)? {
        app.set_status(format!("Team size set to {size}"));
    }
    Ok(())
}

fn cmd_add(args: &str, app: &mut App) -> anyhow::Result<()> {
    let mut parts = args.splitn(3, ' ');
    let draft = ExpenseDraft::new(
        parts.next().unwrap_or(""),
        parts.next().unwrap_or(""),
        parts.next().unwrap_or("").trim(),
    );
    let result = app.tracker.add_expense_from(&draft);
    if let Some(Some(expense)) = app.report(result)? {
        app.set_status(format!(
            "Added {} for {}",
            super::util::format_won(expense.amount),
            expense.name
        ));
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App) -> anyhow::Result<()> {
    if app.tracker.is_loading() {
        app.set_status("Still loading, try again in a moment");
        return Ok(());
    }
    let Some(expense) = app.selected_expense() else {
        app.set_status("No expense selected");
        return Ok(());
    };
    let (id, name) = (expense.id, expense.name.clone());
    app.confirm_message = format!("Delete expense from '{name}'?");
    app.pending_action = Some(PendingAction::DeleteExpense { id, name });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App) -> anyhow::Result<()> {
    if app.tracker.is_loading() {
        app.set_status("Still loading, try again in a moment");
        return Ok(());
    }
    let path = if args.is_empty() {
        crate::export::default_path(&app.tracker.month().to_string())
    } else {
        crate::export::shellexpand(args)
    };

    match crate::export::export_month(app.tracker.record(), Path::new(&path)) {
        Ok(0) => app.set_status(format!("No expenses to export, wrote header to {path}")),
        Ok(count) => app.set_status(format!("Exported {count} expenses to {path}")),
        Err(e) => app.set_status(format!("Export failed: {e:#}")),
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
