use crate::app::{App, Focus};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the subscription list panel
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let is_focused = app.focus == Focus::Subscriptions;
    // Borders and the "> " marker
    let max_url_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if app.subscriptions.is_empty() {
        vec![ListItem::new("No subscriptions (press a to add)")]
    } else {
        app.subscriptions
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let selected = is_focused && i == app.selected_subscription;
                let (marker, style) = if selected {
                    ("> ", app.style("subscription_selected"))
                } else {
                    ("  ", app.style("subscription_normal"))
                };
                let url = strip_control_chars(url);
                let text = truncate_to_width(&url, max_url_width);
                ListItem::new(Line::from(Span::styled(format!("{}{}", marker, text), style)))
            })
            .collect()
    };

    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!("Subscriptions ({})", app.subscriptions.len())),
    );

    let mut state = ListState::default();
    if is_focused && !app.subscriptions.is_empty() {
        state.select(Some(app.selected_subscription));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Render the per-source failures from the last refresh.
pub(super) fn render_errors(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let lines: Vec<Line> = app
        .errors
        .iter()
        .map(|e| {
            Line::from(Span::styled(
                format!("⚠ {}", strip_control_chars(e)),
                app.style("error_text"),
            ))
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("error_text"))
                .title(format!("Errors ({})", app.errors.len())),
        );

    f.render_widget(paragraph, area);
}
