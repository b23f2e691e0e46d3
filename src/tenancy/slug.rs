use axum::http::HeaderMap;

use crate::config;

/// Validate company slug syntax: lowercase ASCII alphanumerics and hyphens,
/// no leading or trailing hyphen, length within the configured bound.
pub fn is_valid_slug(candidate: &str) -> bool {
    let max_len = config::config().tenancy.max_slug_len;
    if candidate.is_empty() || candidate.len() > max_len {
        return false;
    }
    if candidate.starts_with('-') || candidate.ends_with('-') {
        return false;
    }
    candidate
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Extract the slug candidate from request headers. Trims surrounding
/// whitespace; absent, empty or syntactically invalid values yield None.
/// The raw header value is never logged or echoed anywhere.
pub fn candidate_from_headers(headers: &HeaderMap) -> Option<String> {
    let header_name = &config::config().tenancy.company_header;
    let raw = headers.get(header_name.as_str())?.to_str().ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || !is_valid_slug(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_well_formed_slugs() {
        for slug in ["acme", "valid-company-123", "a", "x1-y2-z3"] {
            assert!(is_valid_slug(slug), "slug '{}' should be accepted", slug);
        }
    }

    #[test]
    fn rejects_known_bad_patterns() {
        let invalid = [
            "Company-Name",      // uppercase
            "company_name",      // underscore
            "company@name",      // special characters
            "company name",      // spaces
            "company.name",      // dot
            "../../etc/passwd",  // path traversal
            "<script>",          // markup injection
            "-leading",
            "trailing-",
            "",
        ];
        for slug in invalid {
            assert!(!is_valid_slug(slug), "slug '{}' should be rejected", slug);
        }
    }

    #[test]
    fn rejects_overlong_slugs() {
        let long = "a".repeat(51);
        assert!(!is_valid_slug(&long));
        let max = "a".repeat(50);
        assert!(is_valid_slug(&max));
    }

    #[test]
    fn header_candidate_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("x-company-id", HeaderValue::from_static("  acme  "));
        assert_eq!(candidate_from_headers(&headers), Some("acme".to_string()));
    }

    #[test]
    fn missing_empty_and_malformed_headers_yield_none() {
        let headers = HeaderMap::new();
        assert_eq!(candidate_from_headers(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-company-id", HeaderValue::from_static("   "));
        assert_eq!(candidate_from_headers(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-company-id", HeaderValue::from_static("../../etc/passwd"));
        assert_eq!(candidate_from_headers(&headers), None);
    }
}
