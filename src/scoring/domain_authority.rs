use crate::url::{extract_domain, matches_wildcard};
use crate::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Scores URLs by a configured per-host authority weight
///
/// Exact host entries are looked up first, then `*.example.com` wildcard
/// entries in the order given. Unknown hosts get `default_weight`.
#[derive(Debug, Clone)]
pub struct DomainAuthorityScorer {
    exact: HashMap<String, f64>,
    wildcards: Vec<(String, f64)>,
    default_weight: f64,
}

impl DomainAuthorityScorer {
    pub fn new<I, S>(domain_weights: I, default_weight: f64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        check_unit_range("default domain weight", default_weight)?;

        let mut exact = HashMap::new();
        let mut wildcards = Vec::new();
        for (domain, weight) in domain_weights {
            let domain = domain.as_ref().trim().to_lowercase();
            check_unit_range(&domain, weight)?;
            if domain.starts_with("*.") {
                wildcards.push((domain, weight));
            } else {
                exact.insert(domain, weight);
            }
        }

        Ok(Self {
            exact,
            wildcards,
            default_weight,
        })
    }

    pub fn raw(&self, url: &str) -> f64 {
        let Some(host) = Url::parse(url).ok().and_then(|u| extract_domain(&u)) else {
            return self.default_weight;
        };

        if let Some(weight) = self.exact.get(&host) {
            return *weight;
        }

        self.wildcards
            .iter()
            .find(|(pattern, _)| matches_wildcard(pattern, &host))
            .map_or(self.default_weight, |(_, weight)| *weight)
    }
}

fn check_unit_range(what: &str, weight: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "authority weight for '{}' must be within [0, 1], got {}",
            what, weight
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_and_default() {
        let scorer =
            DomainAuthorityScorer::new([("docs.rs", 0.9), ("Example.com", 0.4)], 0.2).unwrap();
        assert_eq!(scorer.raw("https://docs.rs/tokio"), 0.9);
        assert_eq!(scorer.raw("https://EXAMPLE.com/a"), 0.4);
        assert_eq!(scorer.raw("https://unknown.org/"), 0.2);
    }

    #[test]
    fn test_exact_beats_wildcard() {
        let scorer =
            DomainAuthorityScorer::new([("*.github.io", 0.3), ("rust-lang.github.io", 1.0)], 0.0)
                .unwrap();
        assert_eq!(scorer.raw("https://rust-lang.github.io/book"), 1.0);
        assert_eq!(scorer.raw("https://someone.github.io/"), 0.3);
    }

    #[test]
    fn test_malformed_url_gets_default() {
        let scorer = DomainAuthorityScorer::new([("a.com", 1.0)], 0.5).unwrap();
        assert_eq!(scorer.raw("not a url"), 0.5);
    }

    #[test]
    fn test_weights_validated() {
        assert!(DomainAuthorityScorer::new([("a.com", 2.0)], 0.5).is_err());
        assert!(DomainAuthorityScorer::new(Vec::<(String, f64)>::new(), f64::NAN).is_err());
    }
}
