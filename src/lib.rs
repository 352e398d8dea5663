//! clashview: a terminal viewer for Clash subscription proxy nodes.
//!
//! The library half holds everything the binary wires together, so the
//! aggregation pipeline and presentation state can be driven from tests.

pub mod app;
pub mod config;
pub mod keybindings;
pub mod subscription;
pub mod theme;
pub mod ui;
pub mod util;
