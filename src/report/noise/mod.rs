//! Noise detectors for CSP violation reports.
//!
//! Most violation reports hitting a report endpoint are not caused by the
//! site's own policy: browser extensions, antivirus proxies, ad injectors
//! and a handful of browser bugs all generate reports the operator can do
//! nothing about. Each detector is an independent predicate over one report;
//! the [`Filter`](crate::report::Filter) ORs them together.

pub mod browser_bugs;
pub mod custom_rules;
pub mod domains;
pub mod injected_scripts;
pub mod schemes;

use crate::http::Request;
use crate::report::Report;

/// Classifies a violation report as a known false positive.
pub trait NoiseDetector: Send + Sync {
    /// True when the report is noise and should be suppressed.
    fn matches(&self, report: &Report, request: &Request) -> bool;

    /// Detector name, used in debug traces when a report is suppressed.
    fn name(&self) -> &'static str;
}

pub use browser_bugs::BrowserBugsNoiseDetector;
pub use custom_rules::CustomRulesNoiseDetector;
pub use domains::{DomainsNoiseDetector, DomainsRegexNoiseDetector};
pub use injected_scripts::InjectedScriptsNoiseDetector;
pub use schemes::SchemesNoiseDetector;
