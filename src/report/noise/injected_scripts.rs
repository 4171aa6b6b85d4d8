use crate::http::Request;
use crate::report::noise::NoiseDetector;
use crate::report::Report;
use once_cell::sync::Lazy;
use regex::Regex;

/// Script-sample signatures of code injected by browser extensions and
/// toolbars. These fire as `script-src` violations with a blocked URI of
/// `self` because the browser attributes the injected inline code to the
/// page itself.
static INJECTED_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // AdGuard content script bootstrap
        r"^\s*window\.AG_onLoad",
        // Chrome on iOS internal bridge
        r"__gCrWeb",
        // anti-adblock probes injected by blockers themselves
        r"(?i)^\s*var\s+blockadblock",
        // password manager form fillers
        r"(?i)lastpass",
        r"(?i)onepassword",
        // Grammarly editor overlay
        r"(?i)grammarly",
        // Evernote web clipper
        r"(?i)evernote",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static regex"))
    .collect()
});

#[derive(Debug, Clone, Default)]
pub struct InjectedScriptsNoiseDetector;

impl NoiseDetector for InjectedScriptsNoiseDetector {
    fn matches(&self, report: &Report, _request: &Request) -> bool {
        if report.directive() != Some("script-src") || report.uri() != Some("self") {
            return false;
        }
        let sample = match report.script_sample() {
            Some(sample) => sample,
            None => return false,
        };
        INJECTED_SIGNATURES
            .iter()
            .any(|signature| signature.is_match(sample))
    }

    fn name(&self) -> &'static str {
        "injected_scripts"
    }
}
