use crate::app::{App, InputMode};
use crate::keybindings::Action;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

use super::loop_runner::SPINNER_FRAMES;

/// Render the status bar
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text = status_text(app);
    let updated = app
        .last_updated
        .map(|t| format!("Updated {} ", t.format("%H:%M:%S")))
        .unwrap_or_default();

    let style = app.style("status_bar");
    // .min() before the cast keeps the width well inside u16
    let updated_width = updated.len().min(area.width as usize) as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(updated_width)])
        .split(area);

    f.render_widget(Paragraph::new(text).style(style), chunks[0]);
    f.render_widget(Paragraph::new(updated).style(style), chunks[1]);
}

/// Hints shown in the node and subscription panels.
const NORMAL_HINTS: &[(Action, &str)] = &[
    (Action::Refresh, "refresh"),
    (Action::EnterFilter, "filter"),
    (Action::AddSubscription, "add"),
    (Action::RemoveSubscription, "delete"),
    (Action::Select, "details"),
    (Action::CopyNode, "copy"),
    (Action::CycleFocus, "switch"),
    (Action::ShowHelp, "help"),
    (Action::Quit, "quit"),
];

const DETAIL_HINTS: &[(Action, &str)] = &[
    (Action::CopyNode, "copy JSON"),
    (Action::Back, "close"),
    (Action::Quit, "quit"),
];

const FILTER_HINTS: &[(Action, &str)] = &[
    (Action::CommitFilter, "keep"),
    (Action::ExitFilter, "clear"),
];

/// Refresh progress wins over status messages, which win over key hints.
fn status_text(app: &App) -> Cow<'_, str> {
    if let Some((done, total)) = app.refresh_progress {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        Cow::Owned(format!(
            "{} Refreshing... {}/{} subscriptions",
            spinner, done, total
        ))
    } else if let Some((msg, _, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.input_mode {
            InputMode::Filter => {
                Cow::Owned(format!("Type to filter | {}", key_hints(app, FILTER_HINTS)))
            }
            InputMode::AddSubscription => Cow::Borrowed("Paste a URL | ENTER add | ESC cancel"),
            InputMode::Normal if app.show_node_detail => Cow::Owned(key_hints(app, DETAIL_HINTS)),
            InputMode::Normal => Cow::Owned(key_hints(app, NORMAL_HINTS)),
        }
    }
}

/// `[key] label` pairs from the live bindings. Unbound actions are skipped.
fn key_hints(app: &App, hints: &[(Action, &str)]) -> String {
    hints
        .iter()
        .filter_map(|&(action, label)| {
            app.keybindings
                .key_for(action)
                .map(|key| format!("[{}] {}", key, label))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Fetcher;

    fn test_app() -> App {
        let fetcher = Fetcher::new(reqwest::Client::new(), None, None);
        App::new(fetcher, vec!["https://a.example/sub".to_string()])
    }

    #[test]
    fn test_progress_beats_status_message() {
        let mut app = test_app();
        app.set_status("hello");
        assert_eq!(status_text(&app), "hello");

        app.refresh_progress = Some((1, 3));
        assert!(status_text(&app).ends_with("Refreshing... 1/3 subscriptions"));
    }

    #[test]
    fn test_hints_follow_input_mode() {
        let mut app = test_app();
        let normal = status_text(&app);
        assert!(normal.starts_with("[r] refresh [/] filter"));
        assert!(normal.ends_with("[?] help [q] quit"));

        app.show_node_detail = true;
        assert_eq!(status_text(&app), "[y] copy JSON [Esc] close [q] quit");

        app.show_node_detail = false;
        app.input_mode = InputMode::Filter;
        assert_eq!(status_text(&app), "Type to filter | [Enter] keep [Esc] clear");
    }

    #[test]
    fn test_hints_show_overridden_keys() {
        let mut app = test_app();
        let overrides = std::collections::HashMap::from([
            ("refresh".to_string(), "F5".to_string()),
            ("quit".to_string(), "Ctrl+q".to_string()),
        ]);
        assert!(app.keybindings.apply_overrides(&overrides).is_empty());

        let hints = status_text(&app);
        assert!(hints.starts_with("[F5] refresh"));
        assert!(hints.ends_with("[Ctrl+q] quit"));
        assert!(!hints.contains("[r]"));
    }
}
