use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

/// Largest subscription body accepted, in bytes.
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving one subscription document.
///
/// Every variant carries the subscription URL as the user configured it,
/// not the relay URL the request was actually sent to.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, malformed URL, ...)
    #[error("Request failed for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP response with non-2xx status code
    #[error("Failed to fetch from {url}: {status} {reason}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },
    /// Request exceeded the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    /// Response body exceeded the size limit
    #[error("Response from {url} too large (max {limit} bytes)")]
    ResponseTooLarge { url: String, limit: usize },
}

/// Retrieves raw subscription text over HTTP.
///
/// With a relay configured, requests go to `<relay>?url=<encoded target>`
/// and the relay is expected to return the target body verbatim. Without
/// one, the target is fetched directly.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    relay: Option<String>,
    timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, relay: Option<String>, timeout: Option<Duration>) -> Self {
        let relay = relay
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty());
        Self {
            client,
            relay,
            timeout,
        }
    }

    /// Relay endpoint in use, if any.
    pub fn relay(&self) -> Option<&str> {
        self.relay.as_deref()
    }

    /// The URL a request for `target` is sent to.
    ///
    /// Accepts relay endpoints written either as a bare path
    /// (`https://relay.example/raw`), with an existing query
    /// (`https://relay.example/raw?mode=text`), or ending in the parameter
    /// itself (`https://relay.example/raw?url=`).
    pub fn request_url(&self, target: &str) -> String {
        let Some(relay) = &self.relay else {
            return target.to_owned();
        };

        let encoded = urlencoding::encode(target);
        if relay.ends_with("url=") {
            format!("{}{}", relay, encoded)
        } else if relay.contains('?') {
            format!("{}&url={}", relay, encoded)
        } else {
            format!("{}?url={}", relay, encoded)
        }
    }

    /// Fetch one subscription and return its body as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. No retries.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch_bytes(url))
                .await
                .map_err(|_| FetchError::Timeout {
                    url: url.to_owned(),
                })??,
            None => self.fetch_bytes(url).await?,
        };

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_url = self.request_url(url);
        tracing::debug!(url = %url, request_url = %request_url, "Fetching subscription");

        let response = self
            .client
            .get(&request_url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            });
        }

        read_limited_bytes(response, url, MAX_DOCUMENT_SIZE).await
    }
}

/// Build the shared HTTP client.
///
/// Request timeouts are applied per fetch by [`Fetcher`], not here.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("clashview/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::limited(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}

async fn read_limited_bytes(
    response: reqwest::Response,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge {
                url: url.to_owned(),
                limit,
            });
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Network {
            url: url.to_owned(),
            source,
        })?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge {
                url: url.to_owned(),
                limit,
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
