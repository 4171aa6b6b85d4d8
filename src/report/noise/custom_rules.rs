use crate::error::{Error, Result};
use crate::http::Request;
use crate::report::noise::NoiseDetector;
use crate::report::Report;
use regex::Regex;
use std::collections::HashSet;

/// Operator-supplied noise rules: a URL pattern (literal domain or
/// `/regex/`) mapped to the directive names it applies to, or `*` for all.
/// Malformed regexes fail construction, never at match time.
#[derive(Debug)]
pub struct CustomRulesNoiseDetector {
    rules: Vec<CustomRule>,
}

#[derive(Debug)]
struct CustomRule {
    matcher: UrlMatcher,
    /// None means any directive (`*`)
    directives: Option<HashSet<String>>,
}

#[derive(Debug)]
enum UrlMatcher {
    Domain(String),
    Pattern(Regex),
}

impl CustomRulesNoiseDetector {
    /// Build from `(pattern, directives)` pairs. A pattern wrapped in
    /// slashes is compiled as a regex over the blocked URI; anything else is
    /// a literal domain.
    pub fn new<'a, I>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let mut compiled = Vec::new();
        for (pattern, directives) in rules {
            let matcher = if pattern.len() >= 2 && pattern.starts_with('/') && pattern.ends_with('/')
            {
                let inner = &pattern[1..pattern.len() - 1];
                let regex = Regex::new(inner).map_err(|e| {
                    Error::invalid_custom_rule(format!("bad pattern {}: {}", pattern, e))
                })?;
                UrlMatcher::Pattern(regex)
            } else {
                UrlMatcher::Domain(pattern.to_string())
            };
            let directives = if directives.iter().any(|d| *d == "*") {
                None
            } else {
                Some(directives.into_iter().map(str::to_string).collect())
            };
            compiled.push(CustomRule {
                matcher,
                directives,
            });
        }
        Ok(Self { rules: compiled })
    }
}

impl NoiseDetector for CustomRulesNoiseDetector {
    fn matches(&self, report: &Report, _request: &Request) -> bool {
        self.rules.iter().any(|rule| {
            if let Some(directives) = &rule.directives {
                match report.directive() {
                    Some(directive) if directives.contains(directive) => {}
                    _ => return false,
                }
            }
            match &rule.matcher {
                UrlMatcher::Domain(domain) => report.domain() == Some(domain.as_str()),
                UrlMatcher::Pattern(pattern) => report
                    .uri()
                    .map(|uri| pattern.is_match(uri))
                    .unwrap_or(false),
            }
        })
    }

    fn name(&self) -> &'static str {
        "custom_rules"
    }
}
