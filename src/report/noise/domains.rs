use crate::http::Request;
use crate::report::noise::NoiseDetector;
use crate::report::Report;
use once_cell::sync::Lazy;
use regex::Regex;

/// Domains of third parties known to inject content into other sites'
/// pages (antivirus in-page scanners, adware, ISP toolbars). Matched as a
/// suffix on label boundaries, so `kaspersky-labs.com` also covers
/// `gc.kis.v2.scr.kaspersky-labs.com`.
const NOISY_DOMAINS: &[&str] = &[
    "kaspersky-labs.com",
    "adguard.com",
    "eluxer.net",
    "datafastguru.info",
    "easyinplay.net",
    "vidsquare.net",
    "superfish.com",
    "img.sedoparking.com",
    "free-codecs.com",
];

/// URI patterns covering injector infrastructure that rotates hostnames and
/// therefore cannot be listed as literal domains.
static NOISY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // sedo/parking placeholder farms: numbered subdomains
        r"^https?://img\d+\.sedoparking\.com/",
        // widdit "loading" interstitials
        r"^https?://loading\.retry\.widdit\.com/",
        // superfish asset hosts
        r"\.superfish\.com(:\d+)?/",
        // raw-IP injection proxies
        r"^https?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}(:\d+)?/ads/",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static regex"))
    .collect()
});

/// Exact/suffix domain denylist.
#[derive(Debug, Clone, Default)]
pub struct DomainsNoiseDetector;

impl NoiseDetector for DomainsNoiseDetector {
    fn matches(&self, report: &Report, _request: &Request) -> bool {
        let domain = match report.domain() {
            Some(domain) => domain,
            None => return false,
        };
        NOISY_DOMAINS.iter().any(|noisy| {
            domain == *noisy || domain.ends_with(&format!(".{}", noisy))
        })
    }

    fn name(&self) -> &'static str {
        "domains"
    }
}

/// Regex denylist over the whole blocked URI.
#[derive(Debug, Clone, Default)]
pub struct DomainsRegexNoiseDetector;

impl NoiseDetector for DomainsRegexNoiseDetector {
    fn matches(&self, report: &Report, _request: &Request) -> bool {
        match report.uri() {
            Some(uri) => NOISY_PATTERNS.iter().any(|pattern| pattern.is_match(uri)),
            None => false,
        }
    }

    fn name(&self) -> &'static str {
        "domains_regex"
    }
}
