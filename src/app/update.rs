//! Event loop and key handling.
//!
//! Every backend call happens synchronously inside [`handle_key`]; the loop
//! redraws after each key so busy flags are only visible while a request runs
//! inside the same frame.
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::AdminApi;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, PendingAction};
use crate::billing::{self, ChargesPanel, RefundOutcome};
use crate::search::ImpersonationSearch;
use crate::session;
use crate::ui;

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    api: &dyn AdminApi,
) -> Result<()> {
    reload(app, api);

    while !app.should_quit {
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, api, key);
                }
            }
        }
    }

    info!(uptime_secs = app.started_at.elapsed().as_secs(), "exiting");
    Ok(())
}

/// Re-read the session and reset every piece of local state, as a page reload would.
pub fn reload(app: &mut AppState, api: &dyn AdminApi) {
    app.search = ImpersonationSearch::default();
    app.billing = None;
    app.modal = None;
    app.input_mode = InputMode::Normal;
    app.reloads += 1;
    match api.session() {
        Ok(snapshot) => {
            info!(
                impersonating = snapshot.impersonating,
                tier = ?snapshot.current_tier(),
                "session loaded"
            );
            app.session = snapshot;
            app.status = None;
        }
        Err(e) => {
            warn!(error = %e, "session reload failed");
            app.show_info(format!("Could not load session: {e}"));
        }
    }
}

pub fn handle_key(app: &mut AppState, api: &dyn AdminApi, key: KeyEvent) {
    match app.input_mode {
        InputMode::Search => handle_search_key(app, api, key),
        InputMode::Modal => match app.keymap.resolve(&key) {
            Some(KeyAction::Quit) => app.should_quit = true,
            Some(action) => handle_modal_action(app, api, action),
            None => {}
        },
        InputMode::Normal => {
            if let Some(action) = app.keymap.resolve(&key) {
                handle_normal_action(app, api, action);
            }
        }
    }
}

fn handle_normal_action(app: &mut AppState, api: &dyn AdminApi, action: KeyAction) {
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::Reload => reload(app, api),
        KeyAction::OpenHelp => app.open_modal(ModalState::Help),
        KeyAction::StartSearch => {
            if !app.session.impersonating {
                app.input_mode = InputMode::Search;
            }
        }
        KeyAction::StopImpersonating => {
            if !app.session.impersonating {
                return;
            }
            match session::stop_impersonating(api, app.config.secured, &app.cookies) {
                Ok(()) => reload(app, api),
                Err(e) => {
                    warn!(error = %e, "stop impersonating failed");
                    app.show_info(format!("Could not stop impersonating: {e}"));
                }
            }
        }
        KeyAction::OpenBilling => {
            if !app.can_manage_billing() {
                return;
            }
            match ChargesPanel::open(api) {
                Ok(panel) => {
                    app.billing = Some(panel);
                    app.open_modal(ModalState::Billing);
                }
                Err(e) => {
                    warn!(error = %e, "loading charges failed");
                    app.show_info(format!("Could not load charges: {e}"));
                }
            }
        }
        KeyAction::AddSubscription => {
            let has_plans = !billing::grantable_plans(&app.config.plans).is_empty();
            if app.can_add_subscription() && has_plans {
                app.open_modal(ModalState::AddSubscription { selected: 0 });
            }
        }
        _ => {}
    }
}

fn handle_search_key(app: &mut AppState, api: &dyn AdminApi, key: KeyEvent) {
    // Printable keys belong to the query, so only modified quit bindings apply here.
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && app.keymap.resolve(&key) == Some(KeyAction::Quit)
    {
        app.should_quit = true;
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.search.dismiss();
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Up => {
            app.search.move_up();
            return;
        }
        KeyCode::Down => {
            app.search.move_down();
            return;
        }
        KeyCode::Enter => {
            match app.search.select(api) {
                Ok(Some(_)) => reload(app, api),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "switching impersonation failed");
                    app.show_info(format!("Could not impersonate: {e}"));
                }
            }
            return;
        }
        KeyCode::Backspace => app.search.pop_char(),
        KeyCode::Char(c) => app.search.push_char(c),
        _ => return,
    }
    if let Err(e) = app.search.refresh(api) {
        warn!(error = %e, "impersonation lookup failed");
        app.show_info(format!("Lookup failed: {e}"));
    }
}

fn handle_modal_action(app: &mut AppState, api: &dyn AdminApi, action: KeyAction) {
    let Some(modal) = app.modal.clone() else {
        app.input_mode = InputMode::Normal;
        return;
    };
    match modal {
        ModalState::Info { .. } | ModalState::Help => {
            if matches!(action, KeyAction::Cancel | KeyAction::Confirm | KeyAction::OpenHelp) {
                app.close_modal();
            }
        }
        ModalState::Billing => handle_billing_action(app, action),
        ModalState::AddSubscription { selected } => {
            let plans = billing::grantable_plans(&app.config.plans);
            match action {
                KeyAction::Cancel => app.close_modal(),
                KeyAction::MoveUp => {
                    app.modal = Some(ModalState::AddSubscription {
                        selected: selected.saturating_sub(1),
                    });
                }
                KeyAction::MoveDown => {
                    let next = (selected + 1).min(plans.len().saturating_sub(1));
                    app.modal = Some(ModalState::AddSubscription { selected: next });
                }
                KeyAction::Confirm => {
                    if let Some(plan) = plans.get(selected) {
                        app.open_modal(ModalState::Confirm {
                            action: PendingAction::AddSubscription { plan: plan.clone() },
                            message: billing::ADD_SUBSCRIPTION_CONFIRM.to_string(),
                            selected: 1,
                        });
                    }
                }
                _ => {}
            }
        }
        ModalState::Confirm {
            action: pending,
            message,
            selected,
        } => match action {
            KeyAction::Cancel => app.close_modal(),
            KeyAction::SwitchButton => {
                app.modal = Some(ModalState::Confirm {
                    action: pending,
                    message,
                    selected: if selected == 0 { 1 } else { 0 },
                });
            }
            KeyAction::Confirm => {
                if selected == 0 {
                    perform_pending_action(app, api, pending);
                } else {
                    app.close_modal();
                }
            }
            _ => {}
        },
    }
}

fn handle_billing_action(app: &mut AppState, action: KeyAction) {
    let Some(panel) = app.billing.as_mut() else {
        app.close_modal();
        return;
    };
    match action {
        KeyAction::Cancel => app.close_modal(),
        KeyAction::MoveUp => panel.move_up(),
        KeyAction::MoveDown => panel.move_down(),
        KeyAction::ToggleSelection | KeyAction::Confirm => {
            panel.toggle_cursor();
        }
        KeyAction::Refund => {
            if panel.can_refund() {
                let message = panel.refund_confirm_message();
                app.open_modal(ModalState::Confirm {
                    action: PendingAction::RefundSelected,
                    message,
                    selected: 1,
                });
            }
        }
        KeyAction::CancelSubscription => {
            if !panel.cancelling {
                app.open_modal(ModalState::Confirm {
                    action: PendingAction::CancelSubscription,
                    message: billing::CANCEL_SUBSCRIPTION_CONFIRM.to_string(),
                    selected: 1,
                });
            }
        }
        _ => {}
    }
}

/// Run a confirmed action against the backend.
pub fn perform_pending_action(app: &mut AppState, api: &dyn AdminApi, action: PendingAction) {
    match action {
        PendingAction::RefundSelected => {
            let Some(panel) = app.billing.as_mut() else {
                app.close_modal();
                return;
            };
            match panel.refund_selected(api) {
                Ok(RefundOutcome::Skipped) => app.close_modal(),
                Ok(RefundOutcome::Refunded) => {
                    app.status = Some("Refund issued".to_string());
                    app.close_modal();
                }
                Ok(RefundOutcome::ListStale(e)) => {
                    app.status = Some("Refund issued".to_string());
                    app.show_info(format!("Refund issued; could not reload charges: {e}"));
                }
                Err(e) => {
                    warn!(error = %e, "refund failed");
                    app.show_info(format!("Refund failed: {e}"));
                }
            }
        }
        PendingAction::CancelSubscription => {
            let reload_needed = app
                .billing
                .as_mut()
                .map(|panel| panel.cancel_subscription(api))
                .unwrap_or(false);
            if reload_needed {
                reload(app, api);
            } else {
                app.close_modal();
            }
        }
        PendingAction::AddSubscription { plan } => match billing::add_subscription(api, &plan) {
            Ok(()) => reload(app, api),
            Err(e) => {
                warn!(error = %e, plan = %plan, "add subscription failed");
                app.show_info(format!("Could not add subscription: {e}"));
            }
        },
    }
}
