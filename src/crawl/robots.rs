// src/crawl/robots.rs
// =============================================================================
// A small robots.txt reader.
//
// Only the parts we need:
// - "User-agent:" lines pick which records apply to us
// - "Disallow:" lines inside those records add blocked path prefixes
//
// Everything else (Allow:, Crawl-delay:, Sitemap:, wildcards) is ignored.
// A policy built from empty text blocks nothing, which is what a missing
// robots.txt (HTTP 404) means.
// =============================================================================

use std::collections::HashSet;

/// Path prefixes our user agent may not fetch
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    disallowed: HashSet<String>,
}

impl RobotsPolicy {
    /// The policy used when a site has no robots.txt
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt text for the given user agent
    ///
    /// A `User-agent:` record applies to us when it names `*`, or when its
    /// value and our identity contain one another (case-insensitive).
    pub fn parse(text: &str, user_agent: &str) -> Self {
        let identity = user_agent.trim().to_lowercase();
        let mut disallowed = HashSet::new();
        let mut applies_to_us = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(agent) = field_value(line, "user-agent:") {
                let agent = agent.to_lowercase();
                applies_to_us = agent == "*" || agent_matches(&agent, &identity);
            } else if let Some(path) = field_value(line, "disallow:") {
                if applies_to_us && !path.is_empty() {
                    disallowed.insert(path.to_string());
                }
            }
        }

        Self { disallowed }
    }

    /// True unless some disallowed prefix is a prefix of `path`
    pub fn is_allowed(&self, path: &str) -> bool {
        !self
            .disallowed
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn disallowed_count(&self) -> usize {
        self.disallowed.len()
    }
}

// Returns the trimmed value after `name` when the line starts with it
// (field names are case-insensitive)
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let head = line.get(..name.len())?;
    if head.eq_ignore_ascii_case(name) {
        Some(line[name.len()..].trim())
    } else {
        None
    }
}

fn agent_matches(agent: &str, identity: &str) -> bool {
    if agent.is_empty() || identity.is_empty() {
        return false;
    }
    identity.contains(agent) || agent.contains(identity)
}
