use crate::config::types::{Config, CrawlSettings, FilterEntry, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Filters and scorers are also built once here so bad patterns and weights
/// are reported at load time rather than when the crawl starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_filters(&config.filters)?;
    config.build_filter_chain()?;
    config.build_scorer()?;
    Ok(())
}

fn validate_crawl_settings(config: &CrawlSettings) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.robots_timeout < 1 {
        return Err(ConfigError::Validation(
            "robots-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.fetch_timeout == Some(0) {
        return Err(ConfigError::Validation(
            "fetch-timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only letters, digits, '-' and '_', got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

fn validate_filters(filters: &[FilterEntry]) -> Result<(), ConfigError> {
    for entry in filters {
        match entry {
            FilterEntry::Domain { allowed, blocked } => {
                for domain in allowed.iter().flatten().chain(blocked) {
                    validate_domain_pattern(domain)?;
                }
            }
            FilterEntry::ContentType { allowed_types } => {
                if allowed_types.is_empty() {
                    return Err(ConfigError::Validation(
                        "content-type filter needs at least one allowed type".to_string(),
                    ));
                }
            }
            FilterEntry::UrlPattern { .. } => {}
        }
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain pattern '{}' has no domain",
            pattern
        )));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is not a valid host name",
            domain
        )));
    }

    Ok(())
}
