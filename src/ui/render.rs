//! Render functions for the TUI.
//!
//! This module lays out the panels and draws any active overlay on top.

use crate::app::{App, InputMode};
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::{help, nodes, stats, status, subscriptions};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Errors panel never grows past this many lines of content.
const MAX_ERROR_ROWS: usize = 6;

/// Main render dispatch function.
///
/// Handles terminal size validation, draws the panels, then the overlays.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(stats::HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    stats::render(f, app, chunks[0]);
    render_main_panels(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if app.show_node_detail {
        render_node_detail_overlay(f, app);
    }

    if app.input_mode == InputMode::AddSubscription {
        render_add_overlay(f, app);
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Subscriptions and errors on the left, filter line and node table on the right.
fn render_main_panels(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    if app.errors.is_empty() {
        subscriptions::render(f, app, columns[0]);
    } else {
        // .min() before the cast keeps the height well inside u16
        let errors_height = app.errors.len().min(MAX_ERROR_ROWS) as u16 + 2;
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(errors_height)])
            .split(columns[0]);
        subscriptions::render(f, app, left[0]);
        subscriptions::render_errors(f, app, left[1]);
    }

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(columns[1]);

    nodes::render_filter_line(f, app, right[0]);
    nodes::render(f, app, right[1]);
}

/// Centered rectangle of at most `width` x `height`, leaving a small margin.
fn centered_overlay(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Full configuration of the highlighted node as YAML.
fn render_node_detail_overlay(f: &mut Frame, app: &App) {
    let Some(node) = app.selected_node() else {
        return;
    };

    let body = match serde_yaml::to_string(&serde_yaml::Value::Mapping(node.to_mapping())) {
        Ok(yaml) => strip_control_chars(&yaml).into_owned(),
        Err(e) => format!("Failed to render node: {}", e),
    };

    let area = f.area();
    let overlay = centered_overlay(area, area.width * 3 / 4, area.height * 3 / 4);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let title = format!(" {} ", strip_control_chars(&node.name));
    let paragraph = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(Span::styled(title, app.style("overlay_title")))
                .title_bottom(Line::from(" (y) Copy JSON  (Esc) Close ").centered()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, overlay);
}

/// Prompt for a new subscription URL.
fn render_add_overlay(f: &mut Frame, app: &App) {
    let overlay = centered_overlay(f.area(), 70, 7);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    // "> " prefix, trailing cursor and borders
    let room = overlay.width.saturating_sub(5) as usize;
    let text = format!(
        "Enter subscription URL:\n\n> {}_\n\n(Enter) Add  (Esc) Cancel",
        input_tail(&app.add_input, room)
    );

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(Span::styled(" Add Subscription ", app.style("overlay_title"))),
    );

    f.render_widget(paragraph, overlay);
}

/// Rightmost part of `input` fitting in `max_width` columns, so the cursor
/// end of a long URL stays visible while typing.
fn input_tail(input: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = input.len();
    for (idx, c) in input.char_indices().rev() {
        width += c.width().unwrap_or(0);
        if width > max_width {
            break;
        }
        start = idx;
    }
    &input[start..]
}
