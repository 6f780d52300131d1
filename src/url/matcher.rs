/// Checks if a host matches a domain entry
///
/// Two entry forms are supported:
/// 1. Exact: `"example.com"` matches only `"example.com"`
/// 2. Wildcard: `"*.example.com"` matches `"example.com"` itself and any
///    subdomain of it, however deeply nested
///
/// Both arguments are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use crawl_frontier::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "blog.example.com"));
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "notexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
