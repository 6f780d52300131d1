use std::borrow::Cow;

/// Scores a URL by the share of configured keywords it contains
///
/// The URL is percent-decoded first so `machine%20learning` matches the
/// keyword `machine learning`. Each keyword counts at most once.
#[derive(Debug, Clone)]
pub struct KeywordRelevanceScorer {
    keywords: Vec<String>,
    case_sensitive: bool,
}

impl KeywordRelevanceScorer {
    pub fn new<I, S>(keywords: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| {
                let k = k.as_ref().trim();
                if case_sensitive {
                    k.to_string()
                } else {
                    k.to_lowercase()
                }
            })
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keywords,
            case_sensitive,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// `matches / keywords`, or `0.0` with no keywords
    pub fn raw(&self, url: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }

        let decoded = urlencoding::decode(url).unwrap_or(Cow::Borrowed(url));
        let haystack = if self.case_sensitive {
            decoded
        } else {
            Cow::Owned(decoded.to_lowercase())
        };

        let matches = self
            .keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .count();

        matches as f64 / self.keywords.len() as f64
    }
}
