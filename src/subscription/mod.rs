//! Subscription fetching, parsing and aggregation.
//!
//! This module turns a list of Clash subscription URLs into one flat list of
//! proxy nodes:
//!
//! - **Fetching**: HTTP retrieval of raw document text, directly or via a relay
//! - **Parsing**: YAML decoding and extraction of the `proxies` list
//! - **Aggregation**: concurrent fetch+parse of every URL with per-source
//!   error isolation
//!
//! # Architecture
//!
//! - [`fetcher`] - HTTP client wrapper with relay support and size limits
//! - [`parser`] - Document decoding using `serde_yaml`
//! - [`node`] - The [`ProxyNode`] record and its side map of extra fields
//! - [`aggregator`] - Fan-out/fan-in over all subscriptions
//!
//! # Example
//!
//! ```ignore
//! use clashview::subscription::{aggregate, build_client, Fetcher};
//!
//! let fetcher = Fetcher::new(build_client()?, None, None);
//! let result = aggregate(&fetcher, &urls, None).await;
//! for error in &result.errors {
//!     eprintln!("{}", error);
//! }
//! ```

mod aggregator;
mod fetcher;
mod node;
mod parser;

pub use aggregator::{aggregate, AggregationResult, SourceError};
pub use fetcher::{build_client, FetchError, Fetcher, MAX_DOCUMENT_SIZE};
pub use node::{Port, ProxyNode};
pub use parser::{parse_document, ParseError, SubscriptionDocument};
