//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Protocol tags --
    pub protocol_ss: Style,
    pub protocol_vmess: Style,
    pub protocol_trojan: Style,
    pub protocol_ssr: Style,
    pub protocol_other: Style,

    // -- Node table --
    pub node_header: Style,
    pub node_selected: Style,
    pub node_server: Style,
    pub node_port: Style,

    // -- Subscription list and errors --
    pub subscription_normal: Style,
    pub subscription_selected: Style,
    pub error_text: Style,

    // -- Stats cards --
    pub stat_label: Style,
    pub stat_value: Style,

    // -- Filter line --
    pub filter_active: Style,
    pub filter_summary: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub overlay_title: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            protocol_ss: Style::default().fg(Color::Blue),
            protocol_vmess: Style::default().fg(Color::Magenta),
            protocol_trojan: Style::default().fg(Color::Yellow),
            protocol_ssr: Style::default().fg(Color::LightRed),
            protocol_other: Style::default().fg(Color::Gray),

            node_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            node_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            node_server: Style::default(),
            node_port: Style::default().fg(Color::DarkGray),

            subscription_normal: Style::default(),
            subscription_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            error_text: Style::default().fg(Color::Red),

            stat_label: Style::default().fg(Color::DarkGray),
            stat_value: Style::default().add_modifier(Modifier::BOLD),

            filter_active: Style::default().fg(Color::Yellow),
            filter_summary: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            overlay_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light palette for light terminal backgrounds.
    fn light() -> Self {
        Self {
            protocol_ss: Style::default().fg(Color::Blue),
            protocol_vmess: Style::default().fg(Color::Magenta),
            // Yellow is unreadable on white
            protocol_trojan: Style::default().fg(Color::Rgb(0xd9, 0x77, 0x06)),
            protocol_ssr: Style::default().fg(Color::Red),
            protocol_other: Style::default().fg(Color::DarkGray),

            node_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            node_selected: Style::default().bg(Color::Blue).fg(Color::White),
            node_server: Style::default().fg(Color::Black),
            node_port: Style::default().fg(Color::DarkGray),

            subscription_normal: Style::default().fg(Color::Black),
            subscription_selected: Style::default().bg(Color::Blue).fg(Color::White),
            error_text: Style::default().fg(Color::Red),

            stat_label: Style::default().fg(Color::DarkGray),
            stat_value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            filter_active: Style::default().fg(Color::Magenta),
            filter_summary: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            overlay_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup.
///
/// Built from a `ColorPalette`, this allows resolving role names (e.g.
/// `"node_header"`) to their concrete `Style` at runtime.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 20] = [
    "protocol_ss",
    "protocol_vmess",
    "protocol_trojan",
    "protocol_ssr",
    "protocol_other",
    "node_header",
    "node_selected",
    "node_server",
    "node_port",
    "subscription_normal",
    "subscription_selected",
    "error_text",
    "stat_label",
    "stat_value",
    "filter_active",
    "filter_summary",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "overlay_title",
];

impl StyleMap {
    /// Build a `StyleMap` from a `ColorPalette`.
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 20] = [
            p.protocol_ss,
            p.protocol_vmess,
            p.protocol_trojan,
            p.protocol_ssr,
            p.protocol_other,
            p.node_header,
            p.node_selected,
            p.node_server,
            p.node_port,
            p.subscription_normal,
            p.subscription_selected,
            p.error_text,
            p.stat_label,
            p.stat_value,
            p.filter_active,
            p.filter_summary,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.overlay_title,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }

    /// Style for a protocol tag, matched case-insensitively.
    ///
    /// `ss`, `vmess`, `trojan` and `ssr` have their own colors; anything else
    /// (including an empty type) uses `protocol_other`.
    pub fn protocol(&self, proxy_type: &str) -> Style {
        let role = match proxy_type.to_ascii_lowercase().as_str() {
            "ss" => "protocol_ss",
            "vmess" => "protocol_vmess",
            "trojan" => "protocol_trojan",
            "ssr" => "protocol_ssr",
            _ => "protocol_other",
        };
        self.resolve(role)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_map() -> StyleMap {
        StyleMap::from_palette(&ThemeVariant::Dark.palette())
    }

    #[test]
    fn dark_protocol_colors() {
        let sm = dark_map();
        assert_eq!(sm.protocol("ss").fg, Some(Color::Blue));
        assert_eq!(sm.protocol("vmess").fg, Some(Color::Magenta));
        assert_eq!(sm.protocol("trojan").fg, Some(Color::Yellow));
        assert_eq!(sm.protocol("ssr").fg, Some(Color::LightRed));
        assert_eq!(sm.protocol("hysteria2").fg, Some(Color::Gray));
        assert_eq!(sm.protocol("").fg, Some(Color::Gray));
    }

    #[test]
    fn protocol_lookup_ignores_case() {
        let sm = dark_map();
        assert_eq!(sm.protocol("VMess"), sm.protocol("vmess"));
        assert_eq!(sm.protocol("SSR"), sm.protocol("ssr"));
        // ssr must not fall into the ss bucket
        assert_ne!(sm.protocol("ssr"), sm.protocol("ss"));
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.node_selected, light.node_selected);
        assert_ne!(dark.protocol_trojan, light.protocol_trojan);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name(" DARK "), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next().name(), "Dark");
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("node_header"), palette.node_header);
        assert_eq!(sm.resolve("error_text"), palette.error_text);
        assert_eq!(sm.resolve("status_bar"), palette.status_bar);
    }

    #[test]
    fn style_map_returns_default_for_unknown() {
        assert_eq!(dark_map().resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = dark_map();
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{}' missing from StyleMap", name);
        }
    }
}
