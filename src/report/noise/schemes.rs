use crate::http::Request;
use crate::report::noise::NoiseDetector;
use crate::report::Report;

/// Pseudo-schemes used by browser extensions, toolbars and antivirus
/// in-page proxies. A blocked URI with one of these schemes never refers to
/// content the site itself tried to load.
const NOISY_SCHEMES: &[&str] = &[
    "chromenull",
    "chromeinvoke",
    "chromeinvokeimmediate",
    "chrome-extension",
    "moz-extension",
    "ms-browser-extension",
    "safari-extension",
    "mxaddon-pkg",
    "jar",
    "webviewprogressproxy",
    "resource",
    "moz-safe-about",
    "mbinit",
    "symres",
    "tmtbff",
    "mx",
    "localhost",
    "none",
];

#[derive(Debug, Clone, Default)]
pub struct SchemesNoiseDetector;

impl NoiseDetector for SchemesNoiseDetector {
    fn matches(&self, report: &Report, _request: &Request) -> bool {
        match report.scheme() {
            Some(scheme) => NOISY_SCHEMES.contains(&scheme),
            None => false,
        }
    }

    fn name(&self) -> &'static str {
        "schemes"
    }
}
