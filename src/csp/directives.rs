//! Directive model for one Content-Security-Policy header variant.
//!
//! A [`DirectiveSet`] holds the configured directives of a single policy
//! (enforced or report-only) and renders the final header text, applying
//! browser-capability filtering, default-src fallback elision and inline
//! signature injection.

use crate::csp::parser::parse_source_list;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The closed set of directive names this crate knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveName {
    DefaultSrc,
    ScriptSrc,
    ObjectSrc,
    StyleSrc,
    ImgSrc,
    MediaSrc,
    FrameSrc,
    FontSrc,
    ConnectSrc,
    BaseUri,
    ChildSrc,
    FormAction,
    FrameAncestors,
    PluginTypes,
    ManifestSrc,
    WorkerSrc,
    PrefetchSrc,
    BlockAllMixedContent,
    UpgradeInsecureRequests,
    ReportUri,
    ReportTo,
}

/// How a directive's raw configuration value is serialized and whether it
/// participates in default-src fallback elision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveType {
    /// Space-joined source list, elided when identical to default-src
    SourceList,
    /// Source list that browsers do not fall back for (base-uri, form-action)
    SourceListNoFallback,
    /// plugin-types media type list
    MediaTypeList,
    /// frame-ancestors list
    AncestorSourceList,
    /// report-uri
    UriReference,
    /// Boolean flag emitted as a bare directive name
    NoValue,
    /// report-to group name
    ReportingGroup,
}

impl DirectiveName {
    pub const ALL: [DirectiveName; 21] = [
        DirectiveName::DefaultSrc,
        DirectiveName::ScriptSrc,
        DirectiveName::ObjectSrc,
        DirectiveName::StyleSrc,
        DirectiveName::ImgSrc,
        DirectiveName::MediaSrc,
        DirectiveName::FrameSrc,
        DirectiveName::FontSrc,
        DirectiveName::ConnectSrc,
        DirectiveName::BaseUri,
        DirectiveName::ChildSrc,
        DirectiveName::FormAction,
        DirectiveName::FrameAncestors,
        DirectiveName::PluginTypes,
        DirectiveName::ManifestSrc,
        DirectiveName::WorkerSrc,
        DirectiveName::PrefetchSrc,
        DirectiveName::BlockAllMixedContent,
        DirectiveName::UpgradeInsecureRequests,
        DirectiveName::ReportUri,
        DirectiveName::ReportTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveName::DefaultSrc => "default-src",
            DirectiveName::ScriptSrc => "script-src",
            DirectiveName::ObjectSrc => "object-src",
            DirectiveName::StyleSrc => "style-src",
            DirectiveName::ImgSrc => "img-src",
            DirectiveName::MediaSrc => "media-src",
            DirectiveName::FrameSrc => "frame-src",
            DirectiveName::FontSrc => "font-src",
            DirectiveName::ConnectSrc => "connect-src",
            DirectiveName::BaseUri => "base-uri",
            DirectiveName::ChildSrc => "child-src",
            DirectiveName::FormAction => "form-action",
            DirectiveName::FrameAncestors => "frame-ancestors",
            DirectiveName::PluginTypes => "plugin-types",
            DirectiveName::ManifestSrc => "manifest-src",
            DirectiveName::WorkerSrc => "worker-src",
            DirectiveName::PrefetchSrc => "prefetch-src",
            DirectiveName::BlockAllMixedContent => "block-all-mixed-content",
            DirectiveName::UpgradeInsecureRequests => "upgrade-insecure-requests",
            DirectiveName::ReportUri => "report-uri",
            DirectiveName::ReportTo => "report-to",
        }
    }

    /// Resolve a configured directive name. Unknown names are a
    /// configuration error and fail loudly.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .copied()
            .ok_or_else(|| Error::UnknownDirective(name.to_string()))
    }

    pub fn kind(&self) -> DirectiveType {
        match self {
            DirectiveName::DefaultSrc
            | DirectiveName::ScriptSrc
            | DirectiveName::ObjectSrc
            | DirectiveName::StyleSrc
            | DirectiveName::ImgSrc
            | DirectiveName::MediaSrc
            | DirectiveName::FrameSrc
            | DirectiveName::FontSrc
            | DirectiveName::ConnectSrc
            | DirectiveName::ChildSrc
            | DirectiveName::ManifestSrc
            | DirectiveName::WorkerSrc
            | DirectiveName::PrefetchSrc => DirectiveType::SourceList,
            DirectiveName::BaseUri | DirectiveName::FormAction => {
                DirectiveType::SourceListNoFallback
            }
            DirectiveName::FrameAncestors => DirectiveType::AncestorSourceList,
            DirectiveName::PluginTypes => DirectiveType::MediaTypeList,
            DirectiveName::BlockAllMixedContent | DirectiveName::UpgradeInsecureRequests => {
                DirectiveType::NoValue
            }
            DirectiveName::ReportUri => DirectiveType::UriReference,
            DirectiveName::ReportTo => DirectiveType::ReportingGroup,
        }
    }
}

impl std::fmt::Display for DirectiveName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored value of one directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    /// Rendered source list / media type list / uri reference
    Sources(String),
    /// No-value directive present (block-all-mixed-content, ...)
    Present,
}

/// Which policy variant a DirectiveSet belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Enforce,
    ReportOnly,
}

/// Raw configuration value of one directive: a source list, a pre-rendered
/// string, or a boolean flag for no-value directives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveEntry {
    Sources(Vec<String>),
    Value(String),
    Flag(bool),
}

/// Configuration of both policy variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Directives of the enforced policy
    #[serde(default)]
    pub enforce: HashMap<String, DirectiveEntry>,

    /// Directives of the report-only policy
    #[serde(default)]
    pub report: HashMap<String, DirectiveEntry>,

    /// Also emit 'unsafe-inline' next to injected signatures so CSP-Level-1
    /// browsers still run the inline content
    #[serde(default = "default_true")]
    pub level1_fallback: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enforce: HashMap::new(),
            report: HashMap::new(),
            level1_fallback: true,
        }
    }
}

/// In-memory model of one CSP policy variant.
#[derive(Debug, Clone)]
pub struct DirectiveSet {
    values: IndexMap<DirectiveName, DirectiveValue>,
    level1_fallback: bool,
}

impl DirectiveSet {
    pub fn new(level1_fallback: bool) -> Self {
        Self {
            values: IndexMap::new(),
            level1_fallback,
        }
    }

    /// Configuration ingestion entrypoint: build the directive set of one
    /// policy variant. Directives are ingested in canonical order so header
    /// output is deterministic. Unknown directive names fail fast.
    pub fn from_config(config: &PolicyConfig, kind: PolicyKind) -> Result<Self> {
        let raw = match kind {
            PolicyKind::Enforce => &config.enforce,
            PolicyKind::ReportOnly => &config.report,
        };

        // Reject unknown names even when they would sort after valid ones
        for name in raw.keys() {
            DirectiveName::from_name(name)?;
        }

        let mut set = Self::new(config.level1_fallback);
        for name in DirectiveName::ALL {
            if let Some(entry) = raw.get(name.as_str()) {
                set.set_entry(name, entry)?;
            }
        }
        Ok(set)
    }

    /// Set a directive from its raw string form. Empty values remove the
    /// entry; for no-value directives "true" marks presence and anything
    /// else removes it.
    pub fn set_directive(&mut self, name: &str, value: &str) -> Result<()> {
        let name = DirectiveName::from_name(name)?;
        match name.kind() {
            DirectiveType::NoValue => {
                if value == "true" {
                    self.values.insert(name, DirectiveValue::Present);
                } else {
                    self.values.shift_remove(&name);
                }
            }
            _ => {
                if value.is_empty() {
                    self.values.shift_remove(&name);
                } else {
                    self.values
                        .insert(name, DirectiveValue::Sources(value.to_string()));
                }
            }
        }
        Ok(())
    }

    fn set_entry(&mut self, name: DirectiveName, entry: &DirectiveEntry) -> Result<()> {
        let rendered = match (name.kind(), entry) {
            (DirectiveType::NoValue, DirectiveEntry::Flag(flag)) => {
                if *flag { "true".to_string() } else { String::new() }
            }
            (DirectiveType::NoValue, _) => {
                return Err(Error::invalid_input(format!(
                    "{} takes a boolean, not a source list",
                    name
                )));
            }
            (DirectiveType::MediaTypeList, DirectiveEntry::Sources(list)) => list.join(" "),
            (DirectiveType::UriReference | DirectiveType::ReportingGroup, entry) => match entry {
                DirectiveEntry::Value(value) => value.clone(),
                DirectiveEntry::Sources(list) => list.join(" "),
                DirectiveEntry::Flag(_) => {
                    return Err(Error::invalid_input(format!(
                        "{} takes a value, not a boolean",
                        name
                    )));
                }
            },
            (_, DirectiveEntry::Sources(list)) => parse_source_list(list),
            (_, DirectiveEntry::Value(value)) => parse_source_list(value.split_whitespace()),
            (_, DirectiveEntry::Flag(flag)) => {
                if *flag {
                    return Err(Error::invalid_input(format!(
                        "{} takes a source list, not a boolean",
                        name
                    )));
                }
                String::new()
            }
        };
        self.set_directive(name.as_str(), &rendered)
    }

    pub fn get(&self, name: DirectiveName) -> Option<&DirectiveValue> {
        self.values.get(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn level1_fallback(&self) -> bool {
        self.level1_fallback
    }

    fn default_src(&self) -> Option<&str> {
        match self.values.get(&DirectiveName::DefaultSrc) {
            Some(DirectiveValue::Sources(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// True when the directive can be left out because default-src already
    /// renders to the identical string. Deliberately string-based, not
    /// semantic: "a b" and "b a" are treated as different values.
    fn elidable(&self, name: DirectiveName, rendered: &str) -> bool {
        name != DirectiveName::DefaultSrc
            && name.kind() == DirectiveType::SourceList
            && self.default_src() == Some(rendered)
    }

    /// Build the final header text for one response.
    ///
    /// `allowed` is the directive set the target browser understands;
    /// `signatures` maps script-src/style-src to the nonce and hash tokens
    /// accumulated during rendering (unquoted, e.g. `nonce-x`, `sha256-y`).
    /// An empty result means the caller must omit the header entirely.
    pub fn build_header_value(
        &self,
        allowed: &HashSet<DirectiveName>,
        signatures: Option<&HashMap<DirectiveName, Vec<String>>>,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        for (name, value) in &self.values {
            if !allowed.contains(name) {
                continue;
            }
            match value {
                DirectiveValue::Present => lines.push(name.as_str().to_string()),
                DirectiveValue::Sources(rendered) => {
                    let tokens = signatures
                        .and_then(|sigs| sigs.get(name))
                        .filter(|tokens| !tokens.is_empty());
                    if let Some(tokens) = tokens {
                        lines.push(self.signed_line(name.as_str(), rendered, tokens));
                    } else if !self.elidable(*name, rendered) {
                        lines.push(format!("{} {}", name, rendered));
                    }
                }
            }
        }

        // Inline content registered signatures but script-src/style-src were
        // never configured: derive them from default-src so the signatures
        // still authorize the inline blocks.
        if let Some(default) = self.default_src() {
            if !default.contains("'unsafe-inline'") {
                if let Some(sigs) = signatures {
                    for name in [DirectiveName::ScriptSrc, DirectiveName::StyleSrc] {
                        if !allowed.contains(&name) || self.values.contains_key(&name) {
                            continue;
                        }
                        if let Some(tokens) = sigs.get(&name).filter(|tokens| !tokens.is_empty()) {
                            lines.push(self.signed_line(name.as_str(), default, tokens));
                        }
                    }
                }
            }
        }

        lines.join("; ")
    }

    fn signed_line(&self, name: &str, rendered: &str, tokens: &[String]) -> String {
        let mut line = format!("{} {}", name, rendered);
        if self.level1_fallback && !rendered.contains("'unsafe-inline'") {
            line.push_str(" 'unsafe-inline'");
        }
        let mut seen: Vec<&str> = Vec::new();
        for token in tokens {
            if seen.contains(&token.as_str()) {
                continue;
            }
            seen.push(token);
            line.push_str(&format!(" '{}'", token));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_allowed() -> HashSet<DirectiveName> {
        DirectiveName::ALL.iter().copied().collect()
    }

    fn set_with(directives: &[(&str, &str)]) -> DirectiveSet {
        let mut set = DirectiveSet::new(true);
        for (name, value) in directives {
            set.set_directive(name, value).unwrap();
        }
        set
    }

    #[test]
    fn test_unknown_directive_fails_loudly() {
        let mut set = DirectiveSet::new(true);
        let err = set.set_directive("script-source", "'self'").unwrap_err();
        assert!(matches!(err, Error::UnknownDirective(name) if name == "script-source"));
    }

    #[test]
    fn test_empty_value_removes_entry() {
        let mut set = set_with(&[("script-src", "'self'")]);
        set.set_directive("script-src", "").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_no_value_directive_renders_bare() {
        let set = set_with(&[("upgrade-insecure-requests", "true")]);
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "upgrade-insecure-requests"
        );
    }

    #[test]
    fn test_fallback_elision_on_identical_value() {
        let set = set_with(&[("default-src", "example.org"), ("script-src", "example.org")]);
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "default-src example.org"
        );
    }

    #[test]
    fn test_differing_value_is_kept() {
        let set = set_with(&[
            ("default-src", "example.org"),
            ("script-src", "example.org 'self'"),
        ]);
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "default-src example.org; script-src example.org 'self'"
        );
    }

    #[test]
    fn test_elision_is_string_based_not_semantic() {
        // Reordered but semantically identical lists are kept
        let set = set_with(&[("default-src", "a b"), ("script-src", "b a")]);
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "default-src a b; script-src b a"
        );
    }

    #[test]
    fn test_base_uri_never_elided() {
        let set = set_with(&[("default-src", "'self'"), ("base-uri", "'self'")]);
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "default-src 'self'; base-uri 'self'"
        );
    }

    #[test]
    fn test_capability_filtering_drops_directives() {
        let set = set_with(&[("default-src", "'self'"), ("worker-src", "'none'")]);
        let mut allowed = HashSet::new();
        allowed.insert(DirectiveName::DefaultSrc);
        assert_eq!(set.build_header_value(&allowed, None), "default-src 'self'");
    }

    #[test]
    fn test_empty_set_renders_empty_string() {
        let set = DirectiveSet::new(true);
        assert_eq!(set.build_header_value(&all_allowed(), None), "");
    }

    #[test]
    fn test_signature_injection_on_configured_directive() {
        let set = set_with(&[("script-src", "'self'")]);
        let mut sigs = HashMap::new();
        sigs.insert(
            DirectiveName::ScriptSrc,
            vec!["sha256-abc".to_string(), "nonce-xyz".to_string()],
        );
        assert_eq!(
            set.build_header_value(&all_allowed(), Some(&sigs)),
            "script-src 'self' 'unsafe-inline' 'sha256-abc' 'nonce-xyz'"
        );
    }

    #[test]
    fn test_signature_fallback_synthesizes_script_src_from_default() {
        let set = set_with(&[("default-src", "'self'")]);
        let mut sigs = HashMap::new();
        sigs.insert(DirectiveName::ScriptSrc, vec!["sha-1".to_string()]);
        assert_eq!(
            set.build_header_value(&all_allowed(), Some(&sigs)),
            "default-src 'self'; script-src 'self' 'unsafe-inline' 'sha-1'"
        );
    }

    #[test]
    fn test_no_synthesis_when_default_has_unsafe_inline() {
        let set = set_with(&[("default-src", "'self' 'unsafe-inline'")]);
        let mut sigs = HashMap::new();
        sigs.insert(DirectiveName::ScriptSrc, vec!["sha-1".to_string()]);
        assert_eq!(
            set.build_header_value(&all_allowed(), Some(&sigs)),
            "default-src 'self' 'unsafe-inline'"
        );
    }

    #[test]
    fn test_no_unsafe_inline_when_level1_fallback_disabled() {
        let mut set = DirectiveSet::new(false);
        set.set_directive("script-src", "'self'").unwrap();
        let mut sigs = HashMap::new();
        sigs.insert(DirectiveName::ScriptSrc, vec!["nonce-abc".to_string()]);
        assert_eq!(
            set.build_header_value(&all_allowed(), Some(&sigs)),
            "script-src 'self' 'nonce-abc'"
        );
    }

    #[test]
    fn test_duplicate_signatures_are_deduplicated() {
        let set = set_with(&[("script-src", "'self'")]);
        let mut sigs = HashMap::new();
        sigs.insert(
            DirectiveName::ScriptSrc,
            vec!["sha256-abc".to_string(), "sha256-abc".to_string()],
        );
        assert_eq!(
            set.build_header_value(&all_allowed(), Some(&sigs)),
            "script-src 'self' 'unsafe-inline' 'sha256-abc'"
        );
    }

    #[test]
    fn test_from_config_quotes_keywords() {
        let mut config = PolicyConfig::default();
        config.enforce.insert(
            "default-src".to_string(),
            DirectiveEntry::Sources(vec!["self".to_string(), "example.com".to_string()]),
        );
        config.enforce.insert(
            "upgrade-insecure-requests".to_string(),
            DirectiveEntry::Flag(true),
        );
        let set = DirectiveSet::from_config(&config, PolicyKind::Enforce).unwrap();
        assert_eq!(
            set.build_header_value(&all_allowed(), None),
            "default-src 'self' example.com; upgrade-insecure-requests"
        );
    }

    #[test]
    fn test_from_config_rejects_unknown_directive() {
        let mut config = PolicyConfig::default();
        config.report.insert(
            "scriptz-src".to_string(),
            DirectiveEntry::Value("'self'".to_string()),
        );
        assert!(DirectiveSet::from_config(&config, PolicyKind::ReportOnly).is_err());
        // The enforce variant is unaffected by the broken report section
        assert!(DirectiveSet::from_config(&config, PolicyKind::Enforce).is_ok());
    }

    #[test]
    fn test_report_and_enforce_sections_are_independent() {
        let mut config = PolicyConfig::default();
        config.enforce.insert(
            "default-src".to_string(),
            DirectiveEntry::Value("'self'".to_string()),
        );
        let report = DirectiveSet::from_config(&config, PolicyKind::ReportOnly).unwrap();
        assert!(report.is_empty());
    }
}
