use super::node::ProxyNode;
use serde_yaml::Value;
use thiserror::Error;

/// Top-level key that holds the node list in a Clash document.
const PROXIES_FIELD: &str = "proxies";

/// A subscription document could not be decoded.
#[derive(Debug, Error)]
#[error("Invalid subscription document from {url}: {source}")]
pub struct ParseError {
    pub url: String,
    #[source]
    pub source: serde_yaml::Error,
}

/// Decoded form of one subscription document.
///
/// Only the `proxies` list is read; rule lists, proxy groups and port
/// bindings are ignored.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionDocument {
    pub proxies: Vec<ProxyNode>,
    /// Entries of `proxies` that were not mappings and could not form a node.
    pub skipped: usize,
}

/// Parse raw subscription text.
///
/// A document without a `proxies` sequence (missing key, null, scalar, or a
/// payload that is not a mapping at all) yields an empty node list rather than
/// an error. Only malformed YAML is an error.
pub fn parse_document(text: &str) -> Result<SubscriptionDocument, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(SubscriptionDocument::default());
    }

    let mut root: Value = serde_yaml::from_str(text)?;
    // Resolve `<<: *anchor` merge keys so shared proxy templates expand
    root.apply_merge()?;

    let Some(entries) = root.get(PROXIES_FIELD).and_then(Value::as_sequence) else {
        return Ok(SubscriptionDocument::default());
    };

    let mut document = SubscriptionDocument {
        proxies: Vec::with_capacity(entries.len()),
        skipped: 0,
    };

    for entry in entries {
        match entry.as_mapping() {
            Some(map) => document.proxies.push(ProxyNode::from_mapping(map)),
            None => document.skipped += 1,
        }
    }

    Ok(document)
}
