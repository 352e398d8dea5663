//! Terminal User Interface module.
//!
//! This module provides the TUI for browsing subscription nodes, including:
//! - Main event loop (`run`)
//! - Input handling for normal, filter, and add-subscription modes
//! - Rendering for the stats row, subscription list, and node table
//! - Background refresh event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Layout and overlay dispatch
//! - `helpers` - Refresh spawning and clipboard access
//! - `nodes` - Node table widget
//! - `subscriptions` - Subscription list and errors panel
//! - `stats` - Summary cards
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod nodes;
mod render;
mod stats;
mod status;
mod subscriptions;

// Re-export the public API
pub use loop_runner::{run, Action};
