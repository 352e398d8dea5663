//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms: the defaults live in one table and the
//! `[keybindings]` section of config.toml can rebind any action.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavTop,
    NavBottom,
    PageDown,
    PageUp,
    CycleFocus,
    Back,
    Select,
    Refresh,
    EnterFilter,
    ExitFilter,
    CommitFilter,
    AddSubscription,
    RemoveSubscription,
    CopyNode,
    CycleTheme,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NavTop => "Jump to first item",
            Self::NavBottom => "Jump to last item",
            Self::PageDown => "Page down",
            Self::PageUp => "Page up",
            Self::CycleFocus => "Cycle panel focus",
            Self::Back => "Go back / clear filter",
            Self::Select => "Show node details",
            Self::Refresh => "Refresh all subscriptions",
            Self::EnterFilter => "Filter nodes",
            Self::ExitFilter => "Cancel filter",
            Self::CommitFilter => "Keep filter",
            Self::AddSubscription => "Add subscription URL",
            Self::RemoveSubscription => "Remove subscription",
            Self::CopyNode => "Copy node as JSON",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context. Determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Subscriptions,
    Nodes,
    Filter,
}

impl Context {
    /// Heading used on the help screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Subscriptions => "Subscriptions",
            Self::Nodes => "Nodes",
            Self::Filter => "Filter",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Normalize an incoming event so it can be looked up.
    ///
    /// Terminals report `T` as `Char('T')` plus SHIFT; the case of the char
    /// already carries the shift, so the modifier is dropped for chars.
    fn from_event(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self::new(code, modifiers)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Home", "End", "PageUp", "PageDown"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::ch(c))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Default bindings. Context-specific entries win over Global ones.
const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::ch('g'), Action::NavTop),
    (Context::Global, KeySpec::plain(KeyCode::Home), Action::NavTop),
    (Context::Global, KeySpec::ch('G'), Action::NavBottom),
    (Context::Global, KeySpec::plain(KeyCode::End), Action::NavBottom),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::ch('r'), Action::Refresh),
    (Context::Global, KeySpec::ch('/'), Action::EnterFilter),
    (Context::Global, KeySpec::ch('a'), Action::AddSubscription),
    (Context::Global, KeySpec::ch('T'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Subscriptions, KeySpec::ch('d'), Action::RemoveSubscription),
    (Context::Nodes, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Nodes, KeySpec::ch('y'), Action::CopyNode),
    (Context::Nodes, KeySpec::ch('c'), Action::CopyNode),
    (Context::Nodes, KeySpec::ctrl('d'), Action::PageDown),
    (Context::Nodes, KeySpec::plain(KeyCode::PageDown), Action::PageDown),
    (Context::Nodes, KeySpec::ctrl('u'), Action::PageUp),
    (Context::Nodes, KeySpec::plain(KeyCode::PageUp), Action::PageUp),
    (Context::Filter, KeySpec::plain(KeyCode::Esc), Action::ExitFilter),
    (Context::Filter, KeySpec::plain(KeyCode::Enter), Action::CommitFilter),
];

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    /// Create a registry with the default bindings.
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys in the map are action names (e.g., "quit", "copy_node").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key of that action, in each context the action
    /// was bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key event in a given context.
    ///
    /// Tries the specific context first, then falls back to Global. The
    /// filter context has no Global fallback: while typing, every printable
    /// key is text.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::from_event(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        match context {
            Context::Global | Context::Filter => None,
            _ => self.lookup.get(&(Context::Global, key)).copied(),
        }
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }

    /// Display string of the first key bound to `action`, for inline hints.
    pub fn key_for(&self, action: Action) -> Option<String> {
        self.bindings
            .iter()
            .find(|(_, _, a)| *a == action)
            .map(|(_, key, _)| format_key(key))
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "nav_top" | "top" => Some(Action::NavTop),
        "nav_bottom" | "bottom" => Some(Action::NavBottom),
        "page_down" => Some(Action::PageDown),
        "page_up" => Some(Action::PageUp),
        "cycle_focus" | "tab" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "select" | "details" => Some(Action::Select),
        "refresh" => Some(Action::Refresh),
        "enter_filter" | "filter" | "search" => Some(Action::EnterFilter),
        "exit_filter" => Some(Action::ExitFilter),
        "commit_filter" => Some(Action::CommitFilter),
        "add_subscription" | "add" => Some(Action::AddSubscription),
        "remove_subscription" | "remove" | "delete" => Some(Action::RemoveSubscription),
        "copy_node" | "copy" => Some(Action::CopyNode),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
