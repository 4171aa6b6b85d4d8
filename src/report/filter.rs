//! Noise filtering for violation reports.

use crate::http::Request;
use crate::report::noise::{
    BrowserBugsNoiseDetector, DomainsNoiseDetector, DomainsRegexNoiseDetector,
    InjectedScriptsNoiseDetector, NoiseDetector, SchemesNoiseDetector,
};
use crate::report::Report;

/// Ordered chain of noise detectors. Detectors are order-independent
/// predicates; registration order only affects which one short-circuits.
#[derive(Default)]
pub struct Filter {
    detectors: Vec<Box<dyn NoiseDetector>>,
}

impl Filter {
    /// An empty filter that suppresses nothing.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// A filter with the built-in detectors registered.
    pub fn with_defaults() -> Self {
        let mut filter = Self::new();
        filter.register(Box::new(BrowserBugsNoiseDetector));
        filter.register(Box::new(SchemesNoiseDetector));
        filter.register(Box::new(DomainsNoiseDetector));
        filter.register(Box::new(DomainsRegexNoiseDetector));
        filter.register(Box::new(InjectedScriptsNoiseDetector));
        filter
    }

    pub fn register(&mut self, detector: Box<dyn NoiseDetector>) {
        self.detectors.push(detector);
    }

    /// True when the report is noise and should be suppressed from logs.
    pub fn filter(&self, request: &Request, report: &Report) -> bool {
        for detector in &self.detectors {
            if detector.matches(report, request) {
                log::debug!(
                    "CSP violation report suppressed as noise by {} (uri: {:?})",
                    detector.name(),
                    report.uri()
                );
                return true;
            }
        }
        false
    }
}
