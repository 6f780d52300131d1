use crate::url::path_extension;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// How a content-type weight entry is matched against a URL
#[derive(Debug, Clone)]
pub enum TypeMatcher {
    /// Compared to the lowercase extension of the last path segment
    Extension(String),
    /// Searched in the full URL
    Pattern(Regex),
}

impl TypeMatcher {
    /// Parses a weight key
    ///
    /// Plain alphanumeric keys (optionally with a leading dot, like `".pdf"`)
    /// are extensions; anything else is compiled as a regular expression.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        let trimmed = key.trim().trim_start_matches('.');
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(TypeMatcher::Extension(trimmed.to_lowercase()));
        }
        Regex::new(key)
            .map(TypeMatcher::Pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", key, e)))
    }
}

/// Scores URLs by their declared content type
///
/// Entries are checked in order and the first match decides the raw score.
/// No match scores `0.0`.
#[derive(Debug, Clone)]
pub struct ContentTypeScorer {
    weights: Vec<(TypeMatcher, f64)>,
}

impl ContentTypeScorer {
    pub fn new<I, S>(type_weights: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let weights = type_weights
            .into_iter()
            .map(|(key, weight)| {
                if !(0.0..=1.0).contains(&weight) {
                    return Err(ConfigError::Validation(format!(
                        "content type weight for '{}' must be within [0, 1], got {}",
                        key.as_ref(),
                        weight
                    )));
                }
                Ok((TypeMatcher::parse(key.as_ref())?, weight))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { weights })
    }

    pub fn raw(&self, url: &str) -> f64 {
        let extension = Url::parse(url).ok().and_then(|u| path_extension(&u));

        self.weights
            .iter()
            .find(|(matcher, _)| match matcher {
                TypeMatcher::Extension(ext) => extension.as_deref() == Some(ext.as_str()),
                TypeMatcher::Pattern(re) => re.is_match(url),
            })
            .map_or(0.0, |(_, weight)| *weight)
    }
}
