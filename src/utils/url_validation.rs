//! Validation for the configured provider base URL
//!
//! The API key is sent with every request, so the base URL must:
//! - Use HTTPS (plain HTTP only for loopback hosts, e.g. local mock servers)
//! - Have a host
//! - Carry no query string or fragment

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Errors that can occur during base URL validation
#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be HTTPS, got: {0}")]
    HttpsRequired(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("Base URL must not contain a query string or fragment")]
    UnexpectedComponents,
}

fn is_loopback(parsed: &Url) -> bool {
    match parsed.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Validates a provider base URL and returns it without a trailing slash.
///
/// # Arguments
/// * `url` - The URL string to validate
pub fn validate_base_url(url: &str) -> Result<String, UrlValidationError> {
    let parsed = Url::parse(url.trim())?;

    if parsed.host().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    match parsed.scheme() {
        "https" => {}
        "http" if is_loopback(&parsed) => {}
        other => {
            warn!(url = %url, "Rejecting non-HTTPS provider base URL");
            return Err(UrlValidationError::HttpsRequired(other.to_string()));
        }
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(UrlValidationError::UnexpectedComponents);
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
