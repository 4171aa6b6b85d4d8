use crate::http::Request;
use crate::report::noise::NoiseDetector;
use crate::report::Report;
use once_cell::sync::Lazy;
use regex::Regex;

static FIREFOX_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bfirefox/(\d+)").expect("static regex"));
static GECKO_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\brv:(\d+)").expect("static regex"));

/// Source-file prefixes the browser attributes to itself or to extensions.
const INTERNAL_SOURCE_PREFIXES: &[&str] = &["moz-extension", "view-source", "safari-extension://"];

/// Known browser bugs producing spurious violation reports:
/// - Firefox before 43 reported extension-injected scripts as
///   `script-src self` violations
/// - Gecko-family browsers before 49 reported `base-uri` violations for
///   `about:blank` frames
/// - reports whose source file is browser-internal never concern the page
#[derive(Debug, Clone, Default)]
pub struct BrowserBugsNoiseDetector;

impl BrowserBugsNoiseDetector {
    fn firefox_version(user_agent: &str) -> Option<u32> {
        FIREFOX_VERSION_RE
            .captures(user_agent)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn gecko_version(user_agent: &str) -> Option<u32> {
        GECKO_VERSION_RE
            .captures(user_agent)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .or_else(|| Self::firefox_version(user_agent))
    }
}

impl NoiseDetector for BrowserBugsNoiseDetector {
    fn matches(&self, report: &Report, request: &Request) -> bool {
        if let Some(source_file) = report.source_file() {
            if INTERNAL_SOURCE_PREFIXES
                .iter()
                .any(|prefix| source_file.starts_with(prefix))
            {
                return true;
            }
        }

        let user_agent = match request.user_agent() {
            Some(ua) => ua,
            None => return false,
        };

        if report.directive() == Some("script-src") && report.uri() == Some("self") {
            if let Some(version) = Self::firefox_version(user_agent) {
                if version < 43 {
                    return true;
                }
            }
        }

        if report.directive() == Some("base-uri")
            && matches!(report.uri(), Some("about:blank") | Some("about"))
        {
            if let Some(version) = Self::gecko_version(user_agent) {
                if version < 49 {
                    return true;
                }
            }
        }

        false
    }

    fn name(&self) -> &'static str {
        "browser_bugs"
    }
}
