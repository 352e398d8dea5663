//! Input handling for the TUI.
//!
//! Routes each key press to the overlay or text prompt that owns it, and
//! otherwise through the keybinding registry.

use crate::app::{AddSubscriptionError, App, AppEvent, Focus, InputMode};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::MAX_FILTER_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{copy_selected_node, spawn_refresh};
use super::Action;

/// Longest URL accepted in the add-subscription prompt.
const MAX_URL_INPUT_LENGTH: usize = 2048;

fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Subscriptions => KbContext::Subscriptions,
        Focus::Nodes => KbContext::Nodes,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Ctrl+C always quits, even from a prompt
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    match app.input_mode {
        InputMode::Filter => {
            handle_filter_input(app, code, modifiers);
            return Action::Continue;
        }
        InputMode::AddSubscription => {
            handle_add_input(app, code);
            return Action::Continue;
        }
        InputMode::Normal => {}
    }

    if app.show_node_detail {
        return handle_detail_input(app, code, modifiers);
    }

    handle_normal_input(app, code, modifiers, event_tx)
}

/// Help overlay captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

/// Node detail overlay: Esc/Enter close it, copy and quit still work.
fn handle_detail_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Nodes)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::CopyNode) => copy_selected_node(app),
        Some(KbAction::Back) | Some(KbAction::Select) => app.show_node_detail = false,
        _ => {}
    }
    Action::Continue
}

fn handle_normal_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let context = focus_to_context(app.focus);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::NavTop => app.nav_top(),
        KbAction::NavBottom => app.nav_bottom(),
        KbAction::PageDown => app.page_down(),
        KbAction::PageUp => app.page_up(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::Back => {
            if !app.filter.is_empty() {
                app.clear_filter();
                app.set_status("Filter cleared");
            }
        }
        KbAction::Select => {
            if app.selected_node().is_some() {
                app.show_node_detail = true;
            }
        }
        KbAction::Refresh => spawn_refresh(app, event_tx),
        KbAction::EnterFilter => {
            app.input_mode = InputMode::Filter;
            app.focus = Focus::Nodes;
        }
        KbAction::AddSubscription => {
            app.add_input.clear();
            app.input_mode = InputMode::AddSubscription;
        }
        KbAction::RemoveSubscription => match app.remove_selected_subscription() {
            Some(url) => app.set_status(format!("Removed {} (refresh to update nodes)", url)),
            None => app.set_status("No subscription selected"),
        },
        KbAction::CopyNode => copy_selected_node(app),
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        // Only bound in the filter context
        KbAction::ExitFilter | KbAction::CommitFilter => {}
    }

    Action::Continue
}

/// Filter prompt: every edit re-filters the table immediately.
///
/// Enter keeps the filter, Esc clears it. Both return to normal mode.
fn handle_filter_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Filter)
    {
        Some(KbAction::CommitFilter) => {
            app.input_mode = InputMode::Normal;
            return;
        }
        Some(KbAction::ExitFilter) => {
            app.clear_filter();
            app.input_mode = InputMode::Normal;
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Backspace => {
            let mut query = app.filter.clone();
            query.pop();
            app.set_filter(query);
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.filter.len() + c.len_utf8() > MAX_FILTER_LENGTH {
                app.set_status(format!("Filter at max length ({} chars)", MAX_FILTER_LENGTH));
                return;
            }
            let mut query = app.filter.clone();
            query.push(c);
            app.set_filter(query);
        }
        _ => {}
    }
}

/// Add-subscription prompt: Enter validates and adds, Esc cancels.
fn handle_add_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.add_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.add_input);
            match app.add_subscription(&input) {
                Ok(Some(url)) => {
                    app.focus = Focus::Subscriptions;
                    app.set_status(format!("Added {} (press r to refresh)", url));
                }
                Ok(None) => {}
                Err(e @ AddSubscriptionError::Duplicate(_)) => app.set_status(e.to_string()),
                Err(AddSubscriptionError::Invalid(e)) => {
                    app.set_status(format!("Invalid subscription URL: {}", e))
                }
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.add_input.pop();
        }
        KeyCode::Char(c) => {
            if app.add_input.len() < MAX_URL_INPUT_LENGTH {
                app.add_input.push(c);
            }
        }
        _ => {}
    }
}
