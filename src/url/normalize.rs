use crate::UrlError;
use url::Url;

/// Query parameters that only carry campaign/referral tracking and never
/// change the resource being served
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid", "ref"];

/// Normalizes a URL into the key used by the visited set
///
/// Two links that point at the same resource must normalize to the same
/// string, otherwise the frontier would fetch the resource twice.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything other than http:// and https://
/// 3. Lowercase the host (the scheme is kept, so http and https variants stay
///    distinct, and `www.` is not stripped)
/// 4. Normalize path: drop empty and `.` segments, resolve `..`, drop the
///    trailing slash except for the root
/// 5. Remove fragment
/// 6. Remove tracking query parameters (`utm_*` and a fixed list)
/// 7. Sort remaining query parameters by key, dropping an empty query
///
/// # Examples
///
/// ```
/// use crawl_frontier::url::normalize_url;
///
/// let url = normalize_url("https://WWW.EXAMPLE.COM/page/#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_preserved() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_www_kept_as_distinct_host() {
        let result = normalize_url("https://WWW.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://www.example.com/");
    }

    #[test]
    fn test_same_resource_same_key() {
        let a = normalize_url("https://Example.com/docs/?b=2&a=1#intro").unwrap();
        let b = normalize_url("https://example.com/docs?a=1&b=2&utm_source=feed").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dot_segments_and_slashes() {
        let result = normalize_url("https://example.com//a/../b/./c/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");

        let result = normalize_url("https://example.com/../page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_root_path() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_tracking_only_query_dropped() {
        let result = normalize_url("https://example.com/p?utm_campaign=x&fbclid=y&ref=z").unwrap();
        assert_eq!(result.as_str(), "https://example.com/p");
    }

    #[test]
    fn test_non_tracking_params_kept() {
        let result = normalize_url("https://example.com/search?q=rust&page=2").unwrap();
        assert_eq!(result.as_str(), "https://example.com/search?page=2&q=rust");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            normalize_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(normalize_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
        assert!(normalize_url("").is_err());
    }
}
