use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::app::{App, FormField, InputMode};
use crate::ui::theme;
use crate::ui::util::{format_won, truncate};

pub(crate) fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let border = if editing { theme::ACCENT } else { theme::OVERLAY };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            if editing {
                " New Expense (Tab next field, Enter add, Esc close) "
            } else {
                " New Expense (a to enter) "
            },
            theme::block_title_style(),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let fields = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(50),
        ])
        .split(inner);

    let draft = app.tracker.draft();
    let entries = [
        (FormField::Name, "Name", draft.name.as_str()),
        (FormField::Amount, "Amount", draft.amount.as_str()),
        (FormField::Description, "Note", draft.description.as_str()),
    ];

    for ((field, label, value), rect) in entries.into_iter().zip(fields.iter()) {
        let focused = editing && app.form_field == field;
        let label_style = if focused {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        let max = rect.width.saturating_sub(label.len() as u16 + 3) as usize;
        let line = Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::styled(truncate(value, max), theme::normal_style()),
        ]);
        f.render_widget(Paragraph::new(line), *rect);

        if focused {
            let offset = (label.len() + 2 + value.chars().count().min(max)) as u16;
            f.set_cursor_position((rect.x + offset, rect.y));
        }
    }
}

pub(crate) fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let expenses = &app.tracker.record().expenses;
    let title = format!(" Expenses ({}) ", expenses.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::block_title_style()));

    if expenses.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No expenses recorded yet", theme::dim_style())),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let name_width = 16;
    let date_width = 14;
    let amount_width = 14;
    let desc_width = (area.width as usize)
        .saturating_sub(name_width + date_width + amount_width + 6)
        .max(4);

    let items: Vec<ListItem> = expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, expense)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let name = truncate(&expense.name, name_width - 1);
            let desc = truncate(&expense.description, desc_width);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{name:<name_width$}"), style),
                Span::styled(format!("{:<date_width$}", expense.date), style.fg(theme::TEXT_DIM)),
                Span::styled(format!("{desc:<desc_width$}"), style),
                Span::styled(
                    format!("{:>amount_width$}", format_won(expense.amount)),
                    style.add_modifier(Modifier::BOLD),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
