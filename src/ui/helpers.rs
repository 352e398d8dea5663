//! Helper functions for UI operations.
//!
//! Background task spawning, panic containment and clipboard access shared
//! by the input and event handlers.

use crate::app::{App, AppEvent, COPY_STATUS_DURATION};
use crate::subscription::aggregate;
use crate::util::strip_control_chars;
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::FutureExt;
use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing, a panic becomes
/// `Err(String)` carrying the panic message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic payload".to_string()
            }
        })
}

/// Start a refresh of every subscription unless one is already running.
///
/// The aggregation runs in its own task. Progress and the final result come
/// back over `event_tx` as [`AppEvent::RefreshProgress`] and
/// [`AppEvent::RefreshComplete`]; a panic comes back as
/// [`AppEvent::TaskPanicked`].
pub(super) fn spawn_refresh(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(urls) = app.begin_refresh() else {
        app.set_status("Refresh already in progress");
        return;
    };

    app.set_status(format!("Refreshing {} subscriptions...", urls.len()));
    tracing::info!(sources = urls.len(), "Starting refresh");

    let fetcher = app.fetcher.clone();
    let tx = event_tx.clone();

    app.refresh_handle = Some(tokio::spawn(async move {
        let outcome = catch_task_panic(async {
            let (progress_tx, mut progress_rx) = mpsc::channel::<(usize, usize)>(32);

            // The aggregator owns the only sender, so forwarding ends with it
            let forward = async {
                while let Some((done, total)) = progress_rx.recv().await {
                    if let Err(e) = tx.send(AppEvent::RefreshProgress(done, total)).await {
                        tracing::warn!(error = %e, event = "RefreshProgress", "Channel send failed (receiver dropped)");
                    }
                }
            };

            let (result, ()) = tokio::join!(aggregate(&fetcher, &urls, Some(progress_tx)), forward);
            result
        })
        .await;

        let event = match outcome {
            Ok(result) => AppEvent::RefreshComplete(result),
            Err(panic_msg) => {
                tracing::error!(task = "refresh", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "refresh",
                    error: panic_msg,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send refresh result (receiver dropped)");
        }
    }));
}

/// OSC 52 escape sequence that asks the terminal to put `text` on the clipboard.
pub(super) fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Copy the highlighted node to the clipboard as pretty JSON.
pub(super) fn copy_selected_node(app: &mut App) {
    let Some(node) = app.selected_node() else {
        app.set_status("No node selected");
        return;
    };

    let name = strip_control_chars(&node.name).into_owned();
    let copied = node
        .to_json_pretty()
        .map_err(io::Error::other)
        .and_then(|json| write_clipboard(&json));

    match copied {
        Ok(()) => {
            tracing::debug!(node = %name, "Copied node to clipboard");
            app.set_status_for(format!("Copied {}", name), COPY_STATUS_DURATION);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Clipboard copy failed");
            app.set_status(format!("Copy failed: {}", e));
        }
    }
}

fn write_clipboard(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::Fetcher;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value_through() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom {}", 1) }).await;
        assert_eq!(result, Err("boom 1".to_string()));

        let result: Result<(), String> = catch_task_panic(async { panic!("static") }).await;
        assert_eq!(result, Err("static".to_string()));
    }

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("{}"), "\x1b]52;c;e30=\x07");
    }

    #[tokio::test]
    async fn test_second_refresh_is_rejected() {
        let fetcher = Fetcher::new(reqwest::Client::new(), None, None);
        let mut app = App::new(fetcher, Vec::new());
        let (tx, mut rx) = mpsc::channel(8);

        app.refresh_progress = Some((0, 1));
        spawn_refresh(&mut app, &tx);
        assert!(app.refresh_handle.is_none());
        assert_eq!(
            app.status_message.as_ref().map(|(m, _, _)| m.as_ref()),
            Some("Refresh already in progress")
        );

        app.refresh_progress = None;
        spawn_refresh(&mut app, &tx);
        match rx.recv().await {
            Some(AppEvent::RefreshComplete(result)) => {
                assert!(result.nodes.is_empty());
                assert!(result.errors.is_empty());
            }
            other => panic!("Expected RefreshComplete, got {:?}", other),
        }
    }
}
