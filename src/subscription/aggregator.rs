use super::fetcher::{FetchError, Fetcher};
use super::node::ProxyNode;
use super::parser::{parse_document, ParseError, SubscriptionDocument};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure of one subscription's fetch-and-parse unit.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    /// Nodes from every successful source, concatenated in URL-list order.
    pub nodes: Vec<ProxyNode>,
    /// One `"Failed <url>: <detail>"` message per failed source, in completion order.
    pub errors: Vec<String>,
}

/// Fetch and parse every subscription concurrently and merge the results.
///
/// All sources are in flight at once and the call returns when the last one
/// finishes. A failing source never affects its siblings: its error is
/// recorded in [`AggregationResult::errors`] and it contributes no nodes.
///
/// # Arguments
///
/// * `fetcher` - HTTP fetcher (direct or through a relay)
/// * `urls` - Subscription URLs; node order in the result follows this order
/// * `progress_tx` - Optional channel for `(completed, total)` updates
///
/// # Behavior
///
/// - Empty `urls` returns an empty result without touching the network
/// - Node order is deterministic even though completion order is not
/// - Duplicate nodes across sources are kept
pub async fn aggregate(
    fetcher: &Fetcher,
    urls: &[String],
    progress_tx: Option<mpsc::Sender<(usize, usize)>>,
) -> AggregationResult {
    if urls.is_empty() {
        return AggregationResult::default();
    }

    let total = urls.len();
    let mut per_source: Vec<Vec<ProxyNode>> = std::iter::repeat_with(Vec::new).take(total).collect();
    let mut errors = Vec::new();
    let mut completed = 0usize;

    // Stream items must be owned for the future to be spawnable
    let mut units = stream::iter(urls.iter().cloned().enumerate())
        .map(|(index, url)| async move {
            let outcome = load_source(fetcher, &url).await;
            (index, url, outcome)
        })
        .buffer_unordered(total);

    while let Some((index, url, outcome)) = units.next().await {
        completed += 1;

        match outcome {
            Ok(document) => {
                if document.skipped > 0 {
                    tracing::warn!(
                        url = %url,
                        skipped = document.skipped,
                        "Subscription entries that are not mappings skipped"
                    );
                }
                tracing::debug!(url = %url, nodes = document.proxies.len(), "Subscription loaded");
                per_source[index] = document.proxies;
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Subscription failed");
                errors.push(format!("Failed {}: {}", url, e));
            }
        }

        if let Some(tx) = &progress_tx {
            if let Err(e) = tx.send((completed, total)).await {
                tracing::warn!(error = %e, done = completed, total = total, "Progress channel send failed (receiver dropped)");
            }
        }
    }

    let nodes: Vec<ProxyNode> = per_source.into_iter().flatten().collect();
    tracing::info!(
        sources = total,
        failed = errors.len(),
        nodes = nodes.len(),
        "Aggregation complete"
    );

    AggregationResult { nodes, errors }
}

/// One unit of work: fetch, then parse.
async fn load_source(fetcher: &Fetcher, url: &str) -> Result<SubscriptionDocument, SourceError> {
    let text = fetcher.fetch_text(url).await?;
    let document = parse_document(&text).map_err(|source| ParseError {
        url: url.to_owned(),
        source,
    })?;
    Ok(document)
}
