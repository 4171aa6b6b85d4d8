//! Browser capability tables for CSP directives.
//!
//! Browsers implement different CSP levels; sending a directive a browser
//! does not understand is at best wasted bytes and at worst a source of
//! spurious violation reports. The policy manager maps a browser family to
//! the directive names it is known to support, computed once and shared as
//! read-only statics.

use crate::csp::directives::DirectiveName;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Browser family classification of a User-Agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    Safari,
    Opera,
    Other,
    Unknown,
}

/// CSP Level 1 directives
static LEVEL1: Lazy<HashSet<DirectiveName>> = Lazy::new(|| {
    [
        DirectiveName::DefaultSrc,
        DirectiveName::ConnectSrc,
        DirectiveName::FontSrc,
        DirectiveName::FrameSrc,
        DirectiveName::ImgSrc,
        DirectiveName::MediaSrc,
        DirectiveName::ObjectSrc,
        DirectiveName::ScriptSrc,
        DirectiveName::StyleSrc,
        DirectiveName::ReportUri,
    ]
    .into_iter()
    .collect()
});

/// CSP Level 2 directives (superset of Level 1)
static LEVEL2: Lazy<HashSet<DirectiveName>> = Lazy::new(|| {
    let mut set = LEVEL1.clone();
    set.extend([
        DirectiveName::BaseUri,
        DirectiveName::ChildSrc,
        DirectiveName::FormAction,
        DirectiveName::FrameAncestors,
        DirectiveName::PluginTypes,
    ]);
    set
});

/// CSP Level 3 directives (superset of Level 2)
static LEVEL3: Lazy<HashSet<DirectiveName>> = Lazy::new(|| {
    let mut set = LEVEL2.clone();
    set.extend([
        DirectiveName::ManifestSrc,
        DirectiveName::WorkerSrc,
        DirectiveName::PrefetchSrc,
        DirectiveName::ReportTo,
    ]);
    set
});

/// Level 3 plus draft directives
static LEVEL3_DRAFT: Lazy<HashSet<DirectiveName>> = Lazy::new(|| {
    let mut set = LEVEL3.clone();
    set.extend([
        DirectiveName::BlockAllMixedContent,
        DirectiveName::UpgradeInsecureRequests,
    ]);
    set
});

/// Level 3 plus draft, minus the directives Firefox does not implement
static FIREFOX: Lazy<HashSet<DirectiveName>> = Lazy::new(|| {
    let mut set = LEVEL3_DRAFT.clone();
    set.remove(&DirectiveName::BlockAllMixedContent);
    set.remove(&DirectiveName::ChildSrc);
    set.remove(&DirectiveName::PluginTypes);
    set
});

static EMPTY: Lazy<HashSet<DirectiveName>> = Lazy::new(HashSet::new);

/// Stateless lookup from browser family to supported directive names.
pub struct PolicyManager;

impl PolicyManager {
    /// Directive names a browser family understands. Unknown clients get an
    /// empty set: rather than guessing, the policy is suppressed entirely.
    pub fn allowed_directives(family: BrowserFamily) -> &'static HashSet<DirectiveName> {
        match family {
            BrowserFamily::Chrome | BrowserFamily::Opera | BrowserFamily::Other => &LEVEL3_DRAFT,
            BrowserFamily::Firefox => &FIREFOX,
            BrowserFamily::Safari => &LEVEL1,
            BrowserFamily::Unknown => &EMPTY,
        }
    }
}

/// Classifies a User-Agent string into a browser family.
///
/// The hosting framework usually brings its own classifier; this seam lets
/// it plug in. The built-in implementation does plain substring sniffing.
pub trait UserAgentClassifier: Send + Sync {
    fn classify(&self, user_agent: Option<&str>) -> BrowserFamily;
}

/// Substring-based classifier good enough for standalone use.
#[derive(Debug, Clone, Default)]
pub struct DefaultUserAgentClassifier;

impl UserAgentClassifier for DefaultUserAgentClassifier {
    fn classify(&self, user_agent: Option<&str>) -> BrowserFamily {
        let ua = match user_agent {
            Some(ua) if !ua.trim().is_empty() => ua,
            _ => return BrowserFamily::Unknown,
        };
        // Order matters: Opera and Edge embed "Chrome", Chrome embeds "Safari"
        if ua.contains("OPR/") || ua.contains("Opera") {
            BrowserFamily::Opera
        } else if ua.contains("Edg/") || ua.contains("Edge/") {
            BrowserFamily::Other
        } else if ua.contains("Chrome/") || ua.contains("Chromium/") {
            BrowserFamily::Chrome
        } else if ua.contains("Firefox/") {
            BrowserFamily::Firefox
        } else if ua.contains("Safari/") {
            BrowserFamily::Safari
        } else {
            BrowserFamily::Unknown
        }
    }
}
