use thiserror::Error;
use url::Url;

/// Reasons a subscription URL typed into the UI is rejected.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Subscription URL is empty")]
    Empty,
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Validate a subscription URL before it is added to the list.
///
/// Surrounding whitespace is trimmed. Only `http` and `https` are accepted.
/// Loopback and private hosts are allowed: a local converter service
/// (`http://127.0.0.1:25500/sub?...`) is a normal subscription source.
///
/// Returns the trimmed input rather than `Url::to_string()` so that the
/// stored URL, the error messages and the relay query all show exactly
/// what the user typed.
///
/// # Examples
///
/// ```
/// use clashview::util::validate_subscription_url;
///
/// let url = validate_subscription_url("  https://example.com/clash.yml ").unwrap();
/// assert_eq!(url, "https://example.com/clash.yml");
///
/// assert!(validate_subscription_url("http://127.0.0.1:25500/sub").is_ok());
/// assert!(validate_subscription_url("file:///etc/passwd").is_err());
/// assert!(validate_subscription_url("example.com/clash.yml").is_err());
/// ```
pub fn validate_subscription_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_subscription_url("http://example.com/sub").is_ok());
        assert!(validate_subscription_url("https://example.com/sub?token=abc&target=clash").is_ok());
    }

    #[test]
    fn test_keeps_input_verbatim_after_trim() {
        // Url::parse would add a trailing slash here
        assert_eq!(
            validate_subscription_url("\thttps://Example.com\n").unwrap(),
            "https://Example.com"
        );
    }

    #[test]
    fn test_local_sources_allowed() {
        assert!(validate_subscription_url("http://localhost:25500/sub").is_ok());
        assert!(validate_subscription_url("http://192.168.1.10/clash.yml").is_ok());
        assert!(validate_subscription_url("http://[::1]:8080/sub").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            validate_subscription_url("   "),
            Err(UrlValidationError::Empty)
        ));
    }

    #[test]
    fn test_rejects_other_schemes() {
        for input in ["ftp://example.com/sub", "file:///tmp/clash.yml", "vmess://abc"] {
            assert!(
                matches!(
                    validate_subscription_url(input),
                    Err(UrlValidationError::UnsupportedScheme(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_unparseable() {
        assert!(matches!(
            validate_subscription_url("example.com/clash.yml"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
        assert!(validate_subscription_url("https://").is_err());
    }
}
