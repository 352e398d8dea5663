//! Application event handling.
//!
//! Applies messages from background tasks (refresh progress, refresh
//! results, task panics) to the application state.

use crate::app::{App, AppEvent};
use crate::subscription::AggregationResult;

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::RefreshProgress(done, total) => {
            // A late progress message must not resurrect a finished refresh
            if app.is_refreshing() {
                app.refresh_progress = Some((done, total));
            }
        }
        AppEvent::RefreshComplete(result) => handle_refresh_complete(app, result),
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            if task == "refresh" {
                app.refresh_failed();
            }
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

fn handle_refresh_complete(app: &mut App, result: AggregationResult) {
    let node_count = result.nodes.len();
    let failed = result.errors.len();
    let sources = app.refresh_progress.map(|(_, total)| total).unwrap_or(0);

    app.apply_refresh(result);

    tracing::info!(nodes = node_count, failed, sources, "Refresh complete");

    let msg = match failed {
        0 => format!("Loaded {} nodes", node_count),
        1 => format!("Loaded {} nodes, 1 subscription failed", node_count),
        n => format!("Loaded {} nodes, {} subscriptions failed", node_count, n),
    };
    app.set_status(msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::REFRESH_PANIC_MESSAGE;
    use crate::subscription::{Fetcher, ProxyNode};

    fn test_app() -> App {
        let fetcher = Fetcher::new(reqwest::Client::new(), None, None);
        App::new(fetcher, vec!["https://a.example/sub".to_string()])
    }

    fn named(name: &str) -> ProxyNode {
        ProxyNode {
            name: name.to_string(),
            proxy_type: "ss".to_string(),
            ..ProxyNode::default()
        }
    }

    fn status(app: &App) -> Option<&str> {
        app.status_message.as_ref().map(|(m, _, _)| m.as_ref())
    }

    #[test]
    fn test_progress_updates_while_refreshing() {
        let mut app = test_app();
        app.begin_refresh();
        handle_app_event(&mut app, AppEvent::RefreshProgress(1, 1));
        assert_eq!(app.refresh_progress, Some((1, 1)));
    }

    #[test]
    fn test_late_progress_ignored() {
        let mut app = test_app();
        handle_app_event(&mut app, AppEvent::RefreshProgress(1, 2));
        assert!(!app.is_refreshing());
    }

    #[test]
    fn test_complete_installs_result() {
        let mut app = test_app();
        app.begin_refresh();
        handle_app_event(
            &mut app,
            AppEvent::RefreshComplete(AggregationResult {
                nodes: vec![named("a"), named("b")],
                errors: vec!["Failed https://b.example: 404".to_string()],
            }),
        );
        assert!(!app.is_refreshing());
        assert_eq!(app.nodes.len(), 2);
        assert_eq!(app.visible_count(), 2);
        assert_eq!(status(&app), Some("Loaded 2 nodes, 1 subscription failed"));
    }

    #[test]
    fn test_refresh_panic_keeps_nodes_and_shows_generic_error() {
        let mut app = test_app();
        app.begin_refresh();
        handle_app_event(
            &mut app,
            AppEvent::RefreshComplete(AggregationResult {
                nodes: vec![named("kept")],
                errors: vec![],
            }),
        );

        app.begin_refresh();
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "refresh",
                error: "index out of bounds".to_string(),
            },
        );

        assert!(!app.is_refreshing());
        assert_eq!(app.nodes.len(), 1);
        assert_eq!(app.errors, vec![REFRESH_PANIC_MESSAGE.to_string()]);
        assert_eq!(status(&app), Some("Internal error in refresh task"));
    }
}
