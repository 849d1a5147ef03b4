//! Shared UI components (status bar, dialogs, keybindings reference).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState};
use std::collections::{BTreeMap, BTreeSet};

/// Render the bottom status bar with mode, backend and the latest message.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let security = if app.config.secured { "secured" } else { "unsecured" };
    let mut msg = format!("mode: {mode}  backend: {} ({security})", app.config.base_url);
    if let Some(status) = &app.status {
        msg.push_str("  | ");
        msg.push_str(status);
    }
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let min_w = 50u16.min(max_w);
        let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).min(max_h).max(5);
        let rect = centered_rect(min_w, height, area);
        let p = Paragraph::new(message.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Info")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Yes/No dialog guarding a backend action.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Confirm {
        action,
        message,
        selected,
    } = state
    {
        let width = 60u16.min(area.width.saturating_sub(4)).max(30);
        let height = 8u16.min(area.height);
        let rect = centered_rect(width, height, area);
        let (yes, no) = action.buttons();
        let button = |label: &str, active: bool| {
            if active {
                Span::styled(
                    format!("[ {label} ]"),
                    Style::default()
                        .fg(app.theme.highlight_fg)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                Span::raw(format!("[ {label} ]"))
            }
        };
        let lines = vec![
            Line::raw(message.clone()),
            Line::raw(""),
            Line::from(vec![
                button(yes, *selected == 0),
                Span::raw("  "),
                button(no, *selected == 1),
            ]),
        ];
        let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(action.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.danger)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Keybindings reference built from the live keymap.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let mut general: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    let mut billing: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        let key = Keymap::format_key(mods, code);
        let (section, label) = match action {
            KeyAction::Quit => (&mut general, "Quit"),
            KeyAction::StartSearch => (&mut general, "Search users"),
            KeyAction::StopImpersonating => (&mut general, "Stop impersonating"),
            KeyAction::OpenBilling => (&mut general, "Manage billing"),
            KeyAction::AddSubscription => (&mut general, "Add free subscription"),
            KeyAction::Reload => (&mut general, "Reload session"),
            KeyAction::OpenHelp => (&mut general, "Help"),
            KeyAction::MoveUp => (&mut general, "Move up"),
            KeyAction::MoveDown => (&mut general, "Move down"),
            KeyAction::Confirm => (&mut general, "Confirm"),
            KeyAction::Cancel => (&mut general, "Close"),
            KeyAction::SwitchButton => (&mut general, "Switch button"),
            KeyAction::ToggleSelection => (&mut billing, "Toggle charge"),
            KeyAction::Refund => (&mut billing, "Refund selected"),
            KeyAction::CancelSubscription => (&mut billing, "Cancel subscription"),
        };
        section.entry(label).or_default().insert(key);
    }

    let mut lines: Vec<Line> = Vec::new();
    for (title, section) in [("General:", &general), ("Billing:", &billing)] {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (label, keys) in section {
            let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
            lines.push(Line::from(vec![
                Span::raw(format!("  {label:>22} │ ")),
                Span::styled(joined, Style::default().add_modifier(Modifier::ITALIC)),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::raw(
        "While searching, type to query; Enter impersonates the highlighted user.",
    ));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Keybindings")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
