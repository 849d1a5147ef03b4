use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use crate::app::AppState;
use crate::billing::grantable_plans;
use crate::ui::components::centered_rect;

/// Charges table with refund checkboxes and the two action buttons.
pub fn render_billing_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(panel) = app.billing.as_ref() else {
        return;
    };
    let width = 72u16.min(area.width.saturating_sub(4)).max(50);
    let height = 20u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title("Manage Billing")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)].as_ref())
        .split(inner);

    if panel.charges.is_empty() {
        let p = Paragraph::new("No charges found")
            .alignment(ratatui::layout::Alignment::Center)
            .style(Style::default().fg(app.theme.muted));
        f.render_widget(p, parts[0]);
    } else {
        let rows = panel.charges.iter().map(|c| {
            let checkbox = if panel.is_checked(c) { "[x]" } else { "[ ]" };
            let base = if c.refunded {
                Style::default().fg(app.theme.muted)
            } else {
                Style::default().fg(app.theme.text)
            };
            let status = if c.refunded {
                Span::styled(c.status_label(), Style::default().fg(app.theme.danger))
            } else {
                Span::styled(c.status_label(), Style::default().fg(app.theme.success))
            };
            Row::new(vec![
                Cell::from(checkbox),
                Cell::from(c.date_label()),
                Cell::from(c.amount_label()),
                Cell::from(Line::from(status)),
            ])
            .style(base)
        });
        let widths = [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Min(8),
        ];
        let header = Row::new(vec!["", "Date", "Amount", "Status"])
            .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(
                Style::default()
                    .fg(app.theme.highlight_fg)
                    .bg(app.theme.highlight_bg)
                    .add_modifier(Modifier::BOLD),
            )
            .column_spacing(1);
        let mut state = TableState::default();
        state.select(Some(panel.cursor));
        f.render_stateful_widget(table, parts[0], &mut state);
    }

    let refund_style = if panel.can_refund() {
        Style::default().fg(app.theme.highlight_fg)
    } else {
        Style::default().fg(app.theme.muted)
    };
    let refund = if panel.refunding {
        "Refunding...".to_string()
    } else {
        format!("f: {}", panel.refund_label())
    };
    let cancel = if panel.cancelling {
        "Cancelling...".to_string()
    } else {
        "c: Cancel Subscription".to_string()
    };
    let buttons = Line::from(vec![
        Span::raw("Space: toggle   "),
        Span::styled(refund, refund_style),
        Span::raw("   "),
        Span::styled(cancel, Style::default().fg(app.theme.danger)),
        Span::raw("   Esc: close"),
    ]);
    f.render_widget(Paragraph::new(buttons), parts[1]);
}

/// Plan picker for granting a complimentary subscription.
pub fn render_add_subscription_modal(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let plans = grantable_plans(&app.config.plans);
    let height = (plans.len() as u16 + 3).min(area.height.saturating_sub(2)).max(5);
    let rect = centered_rect(40, height, area);
    let mut lines = vec![Line::from(Span::styled(
        "-- ADD FREE SUBSCRIPTION --",
        Style::default().fg(app.theme.muted),
    ))];
    for (idx, plan) in plans.iter().enumerate() {
        if idx == selected {
            lines.push(Line::from(Span::styled(
                format!("▶ {plan}"),
                Style::default().fg(app.theme.highlight_fg),
            )));
        } else {
            lines.push(Line::raw(format!("  {plan}")));
        }
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .title("Subscription")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
