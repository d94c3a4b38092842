use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::tracker::BudgetTracker;
use crate::ui::app::{App, FormField, InputMode, PendingAction};
use crate::ui::commands;
use crate::ui::render::CHROME_HEIGHT;
use crate::ui::util::{format_won, scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

/// How long to wait for a key before redrawing to pick up finished loads.
const TICK: Duration = Duration::from_millis(100);

pub(crate) fn as_tui(tracker: BudgetTracker, rt: &Runtime) -> Result<()> {
    let mut app = App::new(tracker);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    if let Err(e) = rt.block_on(app.tracker.flush()) {
        tracing::error!(error = %e, "pending saves were not flushed");
    }

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.sync();
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(CHROME_HEIGHT) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app)?,
                InputMode::Command => handle_command_input(key, app)?,
                InputMode::Editing => handle_editing_input(key, app)?,
                InputMode::Confirm => handle_confirm_input(key, app)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: KeyEvent, app: &mut App) -> Result<()> {
    let len = app.tracker.record().expenses.len();
    let page = app.visible_rows;
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..page / 2 {
                scroll_up(&mut app.expense_index, &mut app.expense_scroll);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            scroll_down(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            scroll_up(&mut app.expense_index, &mut app.expense_scroll);
        }
        KeyCode::Char('g') => scroll_to_top(&mut app.expense_index, &mut app.expense_scroll),
        KeyCode::Char('G') => {
            scroll_to_bottom(&mut app.expense_index, &mut app.expense_scroll, len, page);
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app)?,
        KeyCode::Char('+') | KeyCode::Char('=') => adjust_team(app, 1)?,
        KeyCode::Char('-') => adjust_team(app, -1)?,
        KeyCode::Char('a') => {
            if app.tracker.is_loading() {
                app.set_status("Still loading, try again in a moment");
            } else {
                app.open_form();
            }
        }
        KeyCode::Char('D') | KeyCode::Delete => commands::handle_command("delete", app)?,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn adjust_team(app: &mut App, delta: i64) -> Result<()> {
    let result = app.tracker.adjust_team_size(delta);
    if let Some(size) = app.report(result)? {
        app.set_status(format!("Team size: {size}"));
    }
    Ok(())
}

fn handle_command_input(key: KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let result = app.tracker.add_expense();
            // An incomplete draft is ignored and stays in the form.
            if let Some(Some(expense)) = app.report(result)? {
                app.form_field = FormField::Name;
                app.set_status(format!(
                    "Added {} for {}",
                    format_won(expense.amount),
                    expense.name
                ));
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            if !app.tracker.draft().is_empty() {
                app.set_status("Draft kept, press a to continue");
            }
        }
        KeyCode::Tab => app.form_field = app.form_field.next(),
        KeyCode::BackTab => app.form_field = app.form_field.prev(),
        KeyCode::Backspace => {
            focused_field(app).pop();
        }
        KeyCode::Char(c) => {
            focused_field(app).push(c);
        }
        _ => {}
    }
    Ok(())
}

fn focused_field(app: &mut App) -> &mut String {
    let field = app.form_field;
    let draft = app.tracker.draft_mut();
    match field {
        FormField::Name => &mut draft.name,
        FormField::Amount => &mut draft.amount,
        FormField::Description => &mut draft.description,
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteExpense { id, name } => {
                        let result = app.tracker.delete_expense(id);
                        if app.report(result)?.is_some() {
                            app.sync();
                            app.set_status(format!("Deleted expense from {name}"));
                        }
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            // Any other key = cancel
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
    Ok(())
}
