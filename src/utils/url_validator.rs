//! Long URL validation.
//!
//! Only absolute `http` and `https` URLs are accepted as redirect targets.

use serde_json::json;
use url::Url;

use crate::error::AppError;

/// Upper bound on accepted long URL length, measured on the canonical form.
///
/// Canonical URLs are ASCII (non-ASCII is percent-encoded or punycoded), so
/// bytes and characters agree with the column check in the `links` table.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur while validating a long URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::bad_request(e.to_string(), json!({ "field": "url" }))
    }
}

/// Validates a long URL and returns it in canonical form.
///
/// Surrounding whitespace is trimmed and the scheme and host are lowercased by
/// the parser. Path, query and fragment are preserved, with non-ASCII
/// characters percent-encoded. The length cap applies to the result.
///
/// # Errors
///
/// Returns [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes
/// such as `javascript:` or `file:`, and [`UrlValidationError::InvalidFormat`]
/// for anything that does not parse as an absolute URL.
pub fn validate_long_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    if url.as_str().len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(validate_long_url("http://example.com").unwrap(), "http://example.com/");
        assert_eq!(
            validate_long_url("https://example.com/path?q=1").unwrap(),
            "https://example.com/path?q=1"
        );
    }

    #[test]
    fn test_trims_and_lowercases_host() {
        assert_eq!(
            validate_long_url("  HTTPS://EXAMPLE.COM/Path  ").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_keeps_fragment_and_port() {
        assert_eq!(
            validate_long_url("http://localhost:8080/docs#install").unwrap(),
            "http://localhost:8080/docs#install"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(validate_long_url(""), Err(UrlValidationError::Empty)));
        assert!(matches!(validate_long_url("   "), Err(UrlValidationError::Empty)));
    }

    #[test]
    fn test_rejects_relative_and_garbage() {
        assert!(matches!(
            validate_long_url("example.com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_long_url("not a valid url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for input in [
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "file:///etc/passwd",
            "ftp://example.com/file.txt",
            "mailto:test@example.com",
        ] {
            assert!(
                matches!(validate_long_url(input), Err(UrlValidationError::UnsupportedProtocol)),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_overlong() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(validate_long_url(&url), Err(UrlValidationError::TooLong)));
    }

    #[test]
    fn test_rejects_non_ascii_that_expands_past_cap() {
        let url = format!("https://example.com/{}", "é".repeat(1000));
        assert!(url.len() <= MAX_URL_LENGTH);

        assert!(matches!(validate_long_url(&url), Err(UrlValidationError::TooLong)));
    }

    #[test]
    fn test_non_ascii_result_is_encoded_and_within_cap() {
        let canonical = validate_long_url("https://example.com/café").unwrap();

        assert_eq!(canonical, "https://example.com/caf%C3%A9");
        assert!(canonical.is_ascii());
        assert!(canonical.len() <= MAX_URL_LENGTH);
    }

    #[test]
    fn test_maps_to_validation_error() {
        let err: AppError = validate_long_url("ftp://x").unwrap_err().into();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
