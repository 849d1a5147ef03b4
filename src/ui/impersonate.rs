use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::{AppState, InputMode};

/// Search box plus result list, or the impersonation banner while acting as someone.
pub fn render_impersonate(f: &mut Frame, area: Rect, app: &AppState) {
    if app.session.impersonating {
        render_banner(f, area, app);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    let focused = app.input_mode == InputMode::Search;
    let input = if app.search.query.is_empty() && !focused {
        Span::styled("Write the user details", Style::default().fg(app.theme.muted))
    } else {
        Span::styled(app.search.query.clone(), Style::default().fg(app.theme.text))
    };
    let border = if focused { app.theme.highlight_fg } else { app.theme.border };
    let p = Paragraph::new(Line::from(input)).block(
        Block::default()
            .title("Impersonate")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, parts[0]);
    if focused {
        let x = parts[0].x + 1 + app.search.query.chars().count() as u16;
        f.set_cursor_position((x.min(parts[0].right().saturating_sub(2)), parts[0].y + 1));
    }

    if app.search.results.is_empty() {
        return;
    }
    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .map(|c| ListItem::new(c.label()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Results ({})", app.search.results.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .highlight_style(
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(app.search.selected));
    f.render_stateful_widget(list, parts[1], &mut state);
}

fn render_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let mut actions = vec![Span::styled(
        "Currently Impersonating",
        Style::default().fg(app.theme.danger).add_modifier(Modifier::BOLD),
    )];
    actions.push(Span::raw("   x: stop"));
    if app.can_add_subscription() {
        actions.push(Span::raw("   a: add free subscription"));
    }
    if app.can_manage_billing() {
        actions.push(Span::raw("   b: manage billing"));
    }
    let mut lines = vec![Line::from(actions)];
    if let Some(tier) = app.session.current_tier() {
        lines.push(Line::from(Span::styled(
            format!("Tier: {tier}"),
            Style::default().fg(app.theme.muted),
        )));
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Impersonate")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
