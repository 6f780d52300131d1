//! Robots.txt rule evaluation on top of the robotstxt crate

use robotstxt::DefaultMatcher;

/// Compiled robots.txt rules for one origin
///
/// Matching is delegated to [`robotstxt::DefaultMatcher`], which implements
/// Google's robots.txt semantics (longest match wins, `Allow` wins ties).
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    /// Compiles a robots.txt body
    ///
    /// Returns `None` for bodies that are clearly not robots.txt (an HTML page
    /// served in its place, for example), which callers treat as "no rules".
    pub fn parse(content: &str) -> Option<Self> {
        let body = content.trim_start_matches('\u{feff}').trim_start();
        if body.starts_with('<') {
            return None;
        }
        Some(Self {
            content: body.to_string(),
        })
    }

    /// Returns the robots.txt body the rules were compiled from
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a full URL may be fetched by the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the `Crawl-delay` (seconds) that applies to the user agent
    ///
    /// A group naming the agent takes precedence over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = user_agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut group_closed = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if group_closed {
                        group.clear();
                        group_closed = false;
                    }
                    group.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    group_closed = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group.iter().any(|ua| ua != "*" && agent.contains(ua.as_str())) {
                        for_agent = Some(delay);
                    } else if group.iter().any(|ua| ua == "*") {
                        for_wildcard = Some(delay);
                    }
                }
                _ => group_closed = true,
            }
        }

        for_agent.or(for_wildcard)
    }
}
