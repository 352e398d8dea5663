//! Node table and the filter line above it.

use crate::app::{App, Focus, InputMode};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub(super) const EMPTY_MESSAGE: &str = "No nodes found. Try refreshing or adding valid subscriptions.";

const TYPE_WIDTH: u16 = 8;
const PORT_WIDTH: u16 = 6;

/// Render the node table panel.
///
/// Records the number of visible rows in `app.node_page_rows` so page
/// up/down move by one screenful.
pub(super) fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let is_focused = app.focus == Focus::Nodes;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!("Nodes ({})", app.visible_count()));

    // Borders plus the header row
    app.node_page_rows = area.height.saturating_sub(3).max(1) as usize;

    if app.visible_count() == 0 {
        let msg = Paragraph::new(EMPTY_MESSAGE)
            .style(app.style("filter_summary"))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    // Two borders and three single-column gaps between the four columns
    let flexible = area
        .width
        .saturating_sub(2 + 3 + TYPE_WIDTH + PORT_WIDTH) as usize;
    let name_width = flexible * 55 / 100;
    let server_width = flexible - name_width;

    let rows: Vec<Row> = app
        .visible_nodes()
        .map(|node| {
            let proxy_type = node.proxy_type.to_uppercase();
            let port = node.port.as_ref().map(|p| p.to_string()).unwrap_or_default();
            Row::new(vec![
                Cell::from(Span::styled(
                    truncate_to_width(&proxy_type, TYPE_WIDTH as usize).into_owned(),
                    app.theme.protocol(&node.proxy_type),
                )),
                Cell::from(
                    truncate_to_width(&strip_control_chars(&node.name), name_width).into_owned(),
                ),
                Cell::from(Span::styled(
                    truncate_to_width(&strip_control_chars(&node.server), server_width)
                        .into_owned(),
                    app.style("node_server"),
                )),
                Cell::from(Span::styled(
                    truncate_to_width(&strip_control_chars(&port), PORT_WIDTH as usize)
                        .into_owned(),
                    app.style("node_port"),
                )),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(TYPE_WIDTH),
        Constraint::Length(name_width as u16),
        Constraint::Length(server_width as u16),
        Constraint::Length(PORT_WIDTH),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Type", "Name", "Server", "Port"]).style(app.style("node_header")))
        .block(block)
        .row_highlight_style(app.style("node_selected"));

    let mut state = TableState::default();
    state.select(Some(app.selected_node));
    f.render_stateful_widget(table, area, &mut state);
}

/// One-line summary above the table: the filter prompt or query, and how
/// many nodes it lets through.
pub(super) fn render_filter_line(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let summary = format!("Showing {} of {} nodes", app.visible_count(), app.nodes.len());

    let mut spans = Vec::new();
    if app.input_mode == InputMode::Filter {
        spans.push(Span::styled(
            format!(" Filter: {}_ ", app.filter),
            app.style("filter_active").add_modifier(Modifier::BOLD),
        ));
    } else if !app.filter.is_empty() {
        spans.push(Span::styled(
            format!(" Filter: {} ", app.filter),
            app.style("filter_active"),
        ));
    }
    spans.push(Span::styled(format!(" {}", summary), app.style("filter_summary")));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
