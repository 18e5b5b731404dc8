//! URL format check applied before any network I/O.

use std::sync::LazyLock;

use regex::Regex;

/// Scheme, optional `www.`, a dotted host ending in a 1–6 character label, optional path/query.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$",
    )
    .expect("URL_PATTERN regex")
});

/// Returns true when `candidate` looks like an HTTP or HTTPS URL.
pub fn is_valid_url(candidate: &str) -> bool {
    URL_PATTERN.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https_with_path() {
        assert!(is_valid_url("https://example.com/path"));
    }

    #[test]
    fn test_accepts_http_www_and_query() {
        assert!(is_valid_url("http://www.example.co.uk/jobs?id=42&ref=home"));
    }

    #[test]
    fn test_accepts_host_with_port() {
        assert!(is_valid_url("http://127.0.0.1:8080/job"));
    }

    #[test]
    fn test_rejects_free_text() {
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_rejects_ftp_scheme() {
        assert!(!is_valid_url("ftp://x.com"));
    }

    #[test]
    fn test_rejects_empty_string() {
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_rejects_missing_tld() {
        assert!(!is_valid_url("https://localhost/path"));
        assert!(!is_valid_url("https://example"));
    }

    #[test]
    fn test_rejects_overlong_tld() {
        assert!(!is_valid_url("https://example.abcdefgh"));
    }

    #[test]
    fn test_rejects_embedded_whitespace() {
        assert!(!is_valid_url("https://example.com/some path"));
    }
}
