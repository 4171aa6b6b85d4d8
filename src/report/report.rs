//! Parsing of incoming CSP violation reports.

use crate::error::{Error, Result};
use crate::http::Request;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*):").expect("static regex"));

/// One CSP violation, parsed from the browser's `csp-report` POST payload.
/// Missing optional fields are tolerated; the derived `uri`/`scheme`/`domain`
/// fields are computed once at construction.
#[derive(Debug, Clone, Default)]
pub struct Report {
    blocked_uri: Option<String>,
    source_file: Option<String>,
    directive: Option<String>,
    script_sample: Option<String>,
    uri: Option<String>,
    scheme: Option<String>,
    domain: Option<String>,
}

impl Report {
    /// Parse a violation report from the request body.
    ///
    /// Fails with [`Error::NoData`] on an empty body,
    /// [`Error::InvalidPayload`] on malformed JSON and
    /// [`Error::MissingReportKey`] when the top-level `csp-report` key is
    /// absent.
    pub fn from_request(request: &Request) -> Result<Self> {
        let body = request.body_bytes();
        if body.is_empty() {
            return Err(Error::NoData);
        }
        let json: Value =
            serde_json::from_slice(body).map_err(|e| Error::InvalidPayload(e.to_string()))?;
        let data = json
            .get("csp-report")
            .and_then(Value::as_object)
            .ok_or(Error::MissingReportKey)?;

        let get = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let blocked_uri = get("blocked-uri");
        let source_file = get("source-file");
        // violated-directive carries the whole source expression; only the
        // directive name matters here
        let directive = get("effective-directive").or_else(|| {
            get("violated-directive")
                .and_then(|v| v.split_whitespace().next().map(str::to_string))
        });
        let script_sample = get("script-sample");

        let uri = blocked_uri.clone().or_else(|| source_file.clone());
        let scheme = uri.as_deref().and_then(parse_scheme);
        let domain = uri.as_deref().and_then(parse_domain);

        Ok(Report {
            blocked_uri,
            source_file,
            directive,
            script_sample,
            uri,
            scheme,
            domain,
        })
    }

    pub fn blocked_uri(&self) -> Option<&str> {
        self.blocked_uri.as_deref()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// effective-directive, falling back to the violated-directive name
    pub fn directive(&self) -> Option<&str> {
        self.directive.as_deref()
    }

    pub fn script_sample(&self) -> Option<&str> {
        self.script_sample.as_deref()
    }

    /// blocked-uri, falling back to source-file
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

fn parse_scheme(uri: &str) -> Option<String> {
    SCHEME_RE
        .captures(uri)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn parse_domain(uri: &str) -> Option<String> {
    Url::parse(uri)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}
