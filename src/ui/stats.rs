//! Summary cards across the top of the screen.

use crate::app::{App, NodeStats};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by the cards plus the per-type breakdown line.
pub(super) const HEIGHT: u16 = 4;

/// Render the stat cards and the breakdown line below them.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < HEIGHT {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let cards = [
        ("Total", app.stats.total, app.style("stat_value")),
        ("VMess", app.stats.count("vmess"), app.theme.protocol("vmess")),
        ("Trojan", app.stats.count("trojan"), app.theme.protocol("trojan")),
        ("SS/SSR", app.stats.shadowsocks_family(), app.theme.protocol("ss")),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);

    for ((label, value, style), column) in cards.into_iter().zip(columns.iter()) {
        let card = Paragraph::new(Line::from(vec![
            Span::styled(format!("{}: ", label), app.style("stat_label")),
            Span::styled(value.to_string(), style.add_modifier(Modifier::BOLD)),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border")),
        );
        f.render_widget(card, *column);
    }

    let breakdown = Paragraph::new(Span::styled(
        breakdown_text(&app.stats),
        app.style("filter_summary"),
    ));
    f.render_widget(breakdown, rows[1]);
}

/// Every type seen in the last refresh with its count, in name order.
fn breakdown_text(stats: &NodeStats) -> String {
    if stats.by_type.is_empty() {
        return " No nodes loaded".to_string();
    }
    let parts: Vec<String> = stats
        .by_type
        .iter()
        .map(|(proxy_type, count)| {
            let label = if proxy_type.is_empty() {
                "(none)"
            } else {
                proxy_type.as_str()
            };
            format!("{} {}", label, count)
        })
        .collect();
    format!(" By type: {}", parts.join(" · "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::ProxyNode;

    fn typed(proxy_type: &str) -> ProxyNode {
        ProxyNode {
            proxy_type: proxy_type.to_string(),
            ..ProxyNode::default()
        }
    }

    #[test]
    fn test_breakdown_empty() {
        assert_eq!(breakdown_text(&NodeStats::default()), " No nodes loaded");
    }

    #[test]
    fn test_breakdown_sorted_with_untyped_bucket() {
        let stats = NodeStats::from_nodes(&[typed("vmess"), typed("ss"), typed(""), typed("ss")]);
        assert_eq!(breakdown_text(&stats), " By type: (none) 1 · ss 2 · vmess 1");
    }
}
