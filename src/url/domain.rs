use url::Url;

/// Extracts the lowercase host of a URL, without port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawl_frontier::url::extract_domain;
///
/// let url = Url::parse("https://Blog.Example.com:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns the `scheme://host[:port]` key robots.txt rules are scoped to
///
/// robots.txt is per origin, so `http://a.com` and `https://a.com` get
/// separate entries, and a non-default port is part of the key.
pub fn origin_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
