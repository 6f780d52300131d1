//! URL handling module
//!
//! This module provides URL normalization, domain extraction, wildcard domain
//! matching and the small path inspections (extension, segment count) that the
//! filters and scorers share.

mod domain;
mod matcher;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, origin_key};
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

/// Returns the lowercase file extension of the URL's last path segment
///
/// The extension is the text after the last `.` of the final segment, so the
/// query string and fragment never contribute. A segment that starts with a dot
/// or ends with one has no extension.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawl_frontier::url::path_extension;
///
/// let url = Url::parse("https://x.com/files/Report.PDF?download=1").unwrap();
/// assert_eq!(path_extension(&url), Some("pdf".to_string()));
///
/// let url = Url::parse("https://x.com/v1.2/users").unwrap();
/// assert_eq!(path_extension(&url), None);
/// ```
pub fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Counts the non-empty `/`-delimited segments of the URL path
pub fn path_segment_count(url: &Url) -> usize {
    url.path().split('/').filter(|s| !s.is_empty()).count()
}
