use crate::keybindings::KeybindingRegistry;
use crate::subscription::{AggregationResult, Fetcher, ProxyNode};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::{validate_subscription_url, UrlValidationError, MAX_FILTER_LENGTH};
use chrono::{DateTime, Local};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Shown in the errors panel when the refresh task dies instead of returning.
pub const REFRESH_PANIC_MESSAGE: &str = "An unexpected error occurred while fetching.";

/// How long an ordinary status message stays visible.
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

/// How long the "Copied <name>" confirmation stays visible.
pub const COPY_STATUS_DURATION: Duration = Duration::from_secs(2);

/// Rows moved by page up/down when the table height is not known yet.
const DEFAULT_PAGE_ROWS: usize = 10;

// ============================================================================
// Focus and Input Mode
// ============================================================================

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Subscriptions,
    Nodes,
}

/// What printable keys currently do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys dispatch through the keybinding registry
    Normal,
    /// Keys edit the node filter; the table updates on every keystroke
    Filter,
    /// Keys edit the URL in the add-subscription prompt
    AddSubscription,
}

// ============================================================================
// Node statistics
// ============================================================================

/// Summary counts over the current node list.
///
/// Types are counted exactly as written in the documents, so `ss` and `SS`
/// are separate buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl NodeStats {
    pub fn from_nodes(nodes: &[ProxyNode]) -> Self {
        let mut by_type = BTreeMap::new();
        for node in nodes {
            *by_type.entry(node.proxy_type.clone()).or_insert(0) += 1;
        }
        Self {
            total: nodes.len(),
            by_type,
        }
    }

    /// Count for one protocol tag, 0 when absent.
    pub fn count(&self, proxy_type: &str) -> usize {
        self.by_type.get(proxy_type).copied().unwrap_or(0)
    }

    /// Combined `ss` + `ssr` count shown on the SS/SSR card.
    pub fn shadowsocks_family(&self) -> usize {
        self.count("ss") + self.count("ssr")
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Indices of the nodes matching `query`, in list order.
///
/// Case-insensitive substring match over name, type and server. An empty
/// query matches everything.
pub fn filter_indices(nodes: &[ProxyNode], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.matches(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// The nodes matching `query`, in list order.
pub fn filter_nodes<'a>(nodes: &'a [ProxyNode], query: &str) -> Vec<&'a ProxyNode> {
    filter_indices(nodes, query)
        .into_iter()
        .map(|i| &nodes[i])
        .collect()
}

// ============================================================================
// Events
// ============================================================================

/// Messages from background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// `(completed, total)` subscriptions finished so far.
    RefreshProgress(usize, usize),
    RefreshComplete(AggregationResult),
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "refresh")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Subscription editing
// ============================================================================

#[derive(Debug, Error)]
pub enum AddSubscriptionError {
    #[error(transparent)]
    Invalid(#[from] UrlValidationError),
    #[error("Already subscribed: {0}")]
    Duplicate(String),
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub fetcher: Fetcher,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Data
    /// Subscription URLs in display and merge order. Edits apply on the next refresh.
    pub subscriptions: Vec<String>,
    /// Nodes from the last completed refresh, wrapped in Arc so the node
    /// detail overlay and render pass can hold them cheaply.
    pub nodes: Arc<Vec<ProxyNode>>,
    /// Per-source failures from the last refresh.
    pub errors: Vec<String>,
    pub stats: NodeStats,
    pub last_updated: Option<DateTime<Local>>,

    // Filter
    pub filter: String,
    /// Indices into `nodes` matching `filter`. Recomputed whenever either changes.
    filtered: Vec<usize>,

    // UI State
    pub focus: Focus,
    pub input_mode: InputMode,
    pub add_input: String,
    pub selected_subscription: usize,
    /// Position within the filtered view, not within `nodes`.
    pub selected_node: usize,
    /// Visible table rows from the last render, used for paging.
    pub node_page_rows: usize,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub show_node_detail: bool,

    // Refresh
    /// `Some` while a refresh is in flight. Doubles as the single-flight guard.
    pub refresh_progress: Option<(usize, usize)>,
    pub refresh_handle: Option<tokio::task::JoinHandle<()>>,
    /// Current frame of the refresh spinner, advanced by the tick handler.
    pub spinner_frame: usize,

    /// Status message, when it was set, and how long it stays up.
    pub status_message: Option<(Cow<'static, str>, Instant, Duration)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(fetcher: Fetcher, subscriptions: Vec<String>) -> Self {
        Self {
            fetcher,
            theme_variant: ThemeVariant::Dark,
            theme: StyleMap::from_palette(&ThemeVariant::Dark.palette()),
            keybindings: KeybindingRegistry::new(),
            subscriptions,
            nodes: Arc::new(Vec::new()),
            errors: Vec::new(),
            stats: NodeStats::default(),
            last_updated: None,
            filter: String::new(),
            filtered: Vec::new(),
            focus: Focus::Nodes,
            input_mode: InputMode::Normal,
            add_input: String::new(),
            selected_subscription: 0,
            selected_node: 0,
            node_page_rows: DEFAULT_PAGE_ROWS,
            show_help: false,
            help_scroll_offset: 0,
            show_node_detail: false,
            refresh_progress: None,
            refresh_handle: None,
            spinner_frame: 0,
            status_message: None,
            needs_redraw: true,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant and return its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    /// Add a subscription URL typed by the user.
    ///
    /// Returns `Ok(None)` for blank input, which is ignored, and the stored
    /// URL on success. Takes effect on the next refresh.
    pub fn add_subscription(&mut self, input: &str) -> Result<Option<String>, AddSubscriptionError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let url = validate_subscription_url(input)?;
        if self.subscriptions.contains(&url) {
            return Err(AddSubscriptionError::Duplicate(url));
        }

        tracing::info!(url = %url, "Subscription added");
        self.subscriptions.push(url.clone());
        self.selected_subscription = self.subscriptions.len() - 1;
        Ok(Some(url))
    }

    /// Remove every entry equal to `url`. Returns whether anything was removed.
    ///
    /// Nodes already on screen stay until the next refresh.
    pub fn remove_subscription(&mut self, url: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|u| u != url);
        let removed = self.subscriptions.len() != before;
        if removed {
            tracing::info!(url = %url, "Subscription removed");
            self.clamp_selections();
        }
        removed
    }

    /// Remove the highlighted subscription and return it.
    pub fn remove_selected_subscription(&mut self) -> Option<String> {
        let url = self.subscriptions.get(self.selected_subscription)?.clone();
        self.remove_subscription(&url);
        Some(url)
    }

    pub fn selected_subscription_url(&self) -> Option<&str> {
        self.subscriptions
            .get(self.selected_subscription)
            .map(String::as_str)
    }

    // ------------------------------------------------------------------------
    // Refresh lifecycle
    // ------------------------------------------------------------------------

    pub fn is_refreshing(&self) -> bool {
        self.refresh_progress.is_some()
    }

    /// Start a refresh and return the URLs to fetch, or `None` when one is
    /// already in flight.
    ///
    /// Blank entries are skipped. Errors from the previous refresh are
    /// cleared; nodes stay on screen until the new result arrives.
    pub fn begin_refresh(&mut self) -> Option<Vec<String>> {
        if self.is_refreshing() {
            return None;
        }

        let urls: Vec<String> = self
            .subscriptions
            .iter()
            .filter(|u| !u.trim().is_empty())
            .cloned()
            .collect();

        self.refresh_progress = Some((0, urls.len()));
        self.errors.clear();
        self.needs_redraw = true;
        Some(urls)
    }

    /// Install the result of a finished refresh.
    pub fn apply_refresh(&mut self, result: AggregationResult) {
        self.nodes = Arc::new(result.nodes);
        self.errors = result.errors;
        self.stats = NodeStats::from_nodes(&self.nodes);
        self.last_updated = Some(Local::now());
        self.refresh_progress = None;
        self.refresh_handle = None;
        self.recompute_filter();
        self.needs_redraw = true;
    }

    /// Record that the refresh task died. The previous nodes are kept.
    pub fn refresh_failed(&mut self) {
        self.errors.push(REFRESH_PANIC_MESSAGE.to_string());
        self.refresh_progress = None;
        self.refresh_handle = None;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Filter
    // ------------------------------------------------------------------------

    /// Replace the filter query. Input beyond `MAX_FILTER_LENGTH` is cut.
    pub fn set_filter(&mut self, query: impl Into<String>) {
        let mut query = query.into();
        if query.len() > MAX_FILTER_LENGTH {
            let mut end = MAX_FILTER_LENGTH;
            while !query.is_char_boundary(end) {
                end -= 1;
            }
            query.truncate(end);
        }
        self.filter = query;
        self.recompute_filter();
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    fn recompute_filter(&mut self) {
        self.filtered = filter_indices(&self.nodes, &self.filter);
        self.clamp_selections();
    }

    /// Nodes currently visible in the table, in list order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &ProxyNode> + '_ {
        self.filtered.iter().map(|&i| &self.nodes[i])
    }

    pub fn visible_count(&self) -> usize {
        self.filtered.len()
    }

    /// The highlighted node, if the table is not empty.
    pub fn selected_node(&self) -> Option<&ProxyNode> {
        self.filtered
            .get(self.selected_node)
            .and_then(|&i| self.nodes.get(i))
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Subscriptions => Focus::Nodes,
            Focus::Nodes => Focus::Subscriptions,
        };
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Subscriptions => self.subscriptions.len(),
            Focus::Nodes => self.filtered.len(),
        }
    }

    fn focused_selection(&mut self) -> &mut usize {
        match self.focus {
            Focus::Subscriptions => &mut self.selected_subscription,
            Focus::Nodes => &mut self.selected_node,
        }
    }

    /// Move the selection in the focused panel by `delta` rows, clamped to the list.
    pub fn nav_by(&mut self, delta: isize) {
        let max_index = self.focused_len().saturating_sub(1);
        let selected = self.focused_selection();
        *selected = selected.saturating_add_signed(delta).min(max_index);
    }

    pub fn nav_up(&mut self) {
        self.nav_by(-1);
    }

    pub fn nav_down(&mut self) {
        self.nav_by(1);
    }

    pub fn nav_top(&mut self) {
        *self.focused_selection() = 0;
    }

    pub fn nav_bottom(&mut self) {
        let max_index = self.focused_len().saturating_sub(1);
        *self.focused_selection() = max_index;
    }

    pub fn page_down(&mut self) {
        self.nav_by(self.node_page_rows.max(1) as isize);
    }

    pub fn page_up(&mut self) {
        self.nav_by(-(self.node_page_rows.max(1) as isize));
    }

    /// Keep selection indices inside their lists after any change to them.
    pub fn clamp_selections(&mut self) {
        self.selected_subscription = self
            .selected_subscription
            .min(self.subscriptions.len().saturating_sub(1));
        self.selected_node = self
            .selected_node
            .min(self.filtered.len().saturating_sub(1));
        if self.filtered.is_empty() {
            self.show_node_detail = false;
        }
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    /// Set a status message that expires after `STATUS_DURATION`.
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.set_status_for(msg, STATUS_DURATION);
    }

    pub fn set_status_for(&mut self, msg: impl Into<Cow<'static, str>>, duration: Duration) {
        self.status_message = Some((msg.into(), Instant::now(), duration));
        self.needs_redraw = true;
    }

    /// Clear the status message if it has expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, since, duration)) = &self.status_message {
            if since.elapsed() >= *duration {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_handle.take() {
            handle.abort();
            tracing::debug!("Aborted refresh task on App drop");
        }
    }
}
