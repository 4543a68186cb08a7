//! Validation of the competitor URL list.
//!
//! Catches the input problems that would otherwise surface half-way through a
//! run: an empty list, non-HTTP schemes, and strings that are not URLs.
//!
//! # Examples
//!
//! ```
//! use competitor_report_core::*;
//!
//! assert!(validate_urls(&["https://a.example/".to_string()]).is_empty());
//!
//! let errors = validate_urls(&["ftp://a.example/".to_string()]);
//! assert!(matches!(errors[0], UrlError::UnsupportedScheme(_)));
//! ```

use thiserror::Error;
use url::Url;

/// URL list validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// No URLs were supplied.
    #[error("URL list cannot be empty")]
    EmptyList,
    /// The URL does not start with `http://` or `https://`.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The URL could not be parsed or has no host.
    #[error("invalid URL {url}: {reason}")]
    Invalid { url: String, reason: String },
}

/// Validates the URLs to analyze. An empty result means the list is usable.
pub fn validate_urls(urls: &[String]) -> Vec<UrlError> {
    if urls.is_empty() {
        return vec![UrlError::EmptyList];
    }

    let mut errors = Vec::new();
    for raw in urls {
        let trimmed = raw.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            errors.push(UrlError::UnsupportedScheme(trimmed.to_string()));
            continue;
        }
        match Url::parse(trimmed) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {}
            Ok(_) => errors.push(UrlError::Invalid {
                url: trimmed.to_string(),
                reason: "missing host".to_string(),
            }),
            Err(err) => errors.push(UrlError::Invalid {
                url: trimmed.to_string(),
                reason: err.to_string(),
            }),
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(validate_urls(&[]), vec![UrlError::EmptyList]);
    }

    #[test]
    fn test_scheme_must_be_http() {
        let errors = validate_urls(&["example.com".to_string(), "ftp://x.example".to_string()]);
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, UrlError::UnsupportedScheme(_)))
        );
    }

    #[test]
    fn test_unparseable_url_reported() {
        let errors = validate_urls(&["https://exa mple.com".to_string()]);
        assert!(matches!(errors.as_slice(), [UrlError::Invalid { .. }]));
    }

    #[test]
    fn test_valid_urls_pass() {
        let urls = vec![
            "https://a.example/".to_string(),
            "http://b.example/path".to_string(),
        ];
        assert!(validate_urls(&urls).is_empty());
    }
}
