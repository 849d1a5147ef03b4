pub mod billing;
pub mod components;
pub mod impersonate;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let who = if app.session.impersonating {
        "impersonating"
    } else {
        "admin"
    };
    let hint = if app.session.impersonating {
        "x: stop; Ctrl+r: reload; ?: help; q: quit"
    } else {
        "/: search users; Enter: impersonate; Esc: cancel; ?: help; q: quit"
    };
    let p = Paragraph::new(format!("impersonate-admin ({who})  {hint}"))
        .block(
            Block::default()
                .title("impersonate-admin")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    impersonate::render_impersonate(f, root[1], app);
    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = app.modal.clone() else {
        return;
    };
    // Dialogs opened from the billing modal draw on top of it.
    if app.billing.is_some() {
        billing::render_billing_modal(f, area, app);
    }
    match &state {
        ModalState::Billing => {}
        ModalState::AddSubscription { selected } => {
            billing::render_add_subscription_modal(f, area, app, *selected);
        }
        ModalState::Confirm { .. } => components::render_confirm_modal(f, area, app, &state),
        ModalState::Info { .. } => components::render_info_modal(f, area, app, &state),
        ModalState::Help => components::render_help_modal(f, area, app),
    }
}
