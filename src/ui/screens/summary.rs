use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{BudgetSummary, BUDGET_PER_PERSON};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_won, progress_bar};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Team size line
            Constraint::Length(5), // Summary cards
            Constraint::Length(3), // Usage bar
        ])
        .split(area);

    let summary = app.tracker.summary();
    render_team_line(f, chunks[0], app.tracker.record().team_size, &summary);
    render_cards(f, chunks[1], &summary);
    render_usage(f, chunks[2], &summary);
}

fn render_team_line(f: &mut Frame, area: Rect, team_size: u32, summary: &BudgetSummary) {
    let line = Line::from(vec![
        Span::styled(" Team ", theme::dim_style()),
        Span::styled(
            format!("{team_size}"),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " × {} = {}",
                format_won(BUDGET_PER_PERSON),
                format_won(summary.total_budget)
            ),
            theme::dim_style(),
        ),
        Span::styled("   (+/- to adjust)", theme::dim_style()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_cards(f: &mut Frame, area: Rect, summary: &BudgetSummary) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let over = summary.is_over_budget();
    let (title, subtitle) = if over {
        ("Over Budget", "over")
    } else {
        ("Remaining", "left")
    };
    render_card(
        f,
        cards[0],
        title,
        format_won(summary.remaining.saturating_abs()),
        theme::balance_color(over),
        subtitle,
    );
    render_card(
        f,
        cards[1],
        "Total Budget",
        format_won(summary.total_budget),
        theme::ACCENT,
        "",
    );
    render_card(
        f,
        cards[2],
        "Spent",
        format_won(summary.total_spent),
        theme::PEACH,
        "",
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    display: String,
    color: Color,
    subtitle: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::block_title_style()));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            display,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle.to_string(), theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_usage(f: &mut Frame, area: Rect, summary: &BudgetSummary) {
    let color = theme::usage_color(summary.usage_level());
    let width = area.width.saturating_sub(18).max(10) as usize;

    let line = Line::from(vec![
        Span::styled(progress_bar(summary.bar_ratio(), width), Style::default().fg(color)),
        Span::styled(
            format!(" {:.1}% used", summary.usage_percent),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]);

    let usage = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Usage ", theme::block_title_style())),
    );
    f.render_widget(usage, area);
}
