use super::{parse_candidate, FilterDecision, FilterStats, FilterStatsSnapshot};
use crate::url::path_extension;

/// Extension to MIME type table used to guess what a URL will return
const MIME_TYPES: &[(&str, &str)] = &[
    // Documents
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("shtml", "text/html"),
    ("php", "text/html"),
    ("asp", "text/html"),
    ("aspx", "text/html"),
    ("jsp", "text/html"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("xml", "application/xml"),
    ("rss", "application/rss+xml"),
    ("atom", "application/atom+xml"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("rtf", "application/rtf"),
    ("epub", "application/epub+zip"),
    // Web assets
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("wasm", "application/wasm"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    // Images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("bmp", "image/bmp"),
    ("avif", "image/avif"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    // Archives and binaries
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("7z", "application/x-7z-compressed"),
    ("rar", "application/vnd.rar"),
    ("exe", "application/octet-stream"),
    ("dmg", "application/octet-stream"),
    ("iso", "application/octet-stream"),
];

/// Looks up the MIME type for a lowercase file extension
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Admits URLs whose file extension maps to an allowed MIME type
///
/// URLs without an extension are assumed to be dynamic pages and admitted.
/// An extension missing from the table is rejected. An allowed type matches
/// when it is a case-insensitive substring of the mapped MIME type, so
/// `"text/html"` matches exactly and `"image/"` admits every image type.
#[derive(Debug)]
pub struct ContentTypeFilter {
    allowed_types: Vec<String>,
    stats: FilterStats,
}

impl ContentTypeFilter {
    pub fn new<I, S>(allowed_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_types: allowed_types
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            stats: FilterStats::new(),
        }
    }

    pub fn check(&self, url: &str) -> FilterDecision {
        let decision = self.decide(url);
        self.stats.record(decision.is_pass());
        decision
    }

    fn decide(&self, url: &str) -> FilterDecision {
        let parsed = match parse_candidate(url) {
            Ok(parsed) => parsed,
            Err(rejection) => return rejection,
        };

        let Some(ext) = path_extension(&parsed) else {
            return FilterDecision::Pass;
        };

        match mime_for_extension(&ext) {
            Some(mime) if self.allowed_types.iter().any(|t| mime.contains(t.as_str())) => {
                FilterDecision::Pass
            }
            Some(mime) => FilterDecision::Reject(format!("content type {} not allowed", mime)),
            None => FilterDecision::Reject(format!("unknown extension .{}", ext)),
        }
    }

    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }
}
