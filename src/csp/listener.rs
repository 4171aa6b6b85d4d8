//! Per-request CSP orchestration.
//!
//! The listener resets signature state when a request starts, collects
//! nonces and hashes while the page renders, and assembles the enforced and
//! report-only headers when the response is about to be sent.

use crate::csp::directives::{DirectiveName, DirectiveSet, PolicyConfig, PolicyKind};
use crate::csp::nonce::NonceGenerator;
use crate::csp::policy::{DefaultUserAgentClassifier, PolicyManager, UserAgentClassifier};
use crate::csp::sha::ShaComputer;
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::middleware::{InboundAction, InboundMiddleware, OutboundMiddleware};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const HEADER_ENFORCE: &str = "Content-Security-Policy";
pub const HEADER_REPORT: &str = "Content-Security-Policy-Report-Only";
pub const HEADER_ENFORCE_COMPAT: &str = "X-Content-Security-Policy";
pub const HEADER_REPORT_COMPAT: &str = "X-Content-Security-Policy-Report-Only";

/// CSP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CspConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Response content types the headers apply to; empty means all
    #[serde(default)]
    pub content_types: Vec<String>,

    /// Request hosts the headers apply to; empty means all
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Also emit the legacy X-Content-Security-Policy* aliases
    #[serde(default)]
    pub compat_headers: bool,

    /// Hash algorithm for inline signatures: sha256, sha384 or sha512
    #[serde(default = "default_hash_algorithm")]
    pub hash: String,
}

fn default_hash_algorithm() -> String {
    "sha256".to_string()
}

impl Default for CspConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            content_types: Vec::new(),
            hosts: Vec::new(),
            compat_headers: false,
            hash: default_hash_algorithm(),
        }
    }
}

/// Nonces and hashes collected during one request's rendering phase.
#[derive(Debug, Default)]
struct SignatureState {
    sha: HashMap<DirectiveName, Vec<String>>,
    script_nonce: Option<String>,
    style_nonce: Option<String>,
}

impl SignatureState {
    fn into_signatures(mut self) -> HashMap<DirectiveName, Vec<String>> {
        if let Some(nonce) = self.script_nonce.take() {
            self.sha
                .entry(DirectiveName::ScriptSrc)
                .or_default()
                .push(format!("nonce-{}", nonce));
        }
        if let Some(nonce) = self.style_nonce.take() {
            self.sha
                .entry(DirectiveName::StyleSrc)
                .or_default()
                .push(format!("nonce-{}", nonce));
        }
        self.sha
    }
}

/// Dual-phase CSP listener.
///
/// One instance is shared across requests; per-request signature state is
/// keyed by the request id, so concurrent requests cannot corrupt each
/// other's accumulators. Render-time calls on a request that never passed
/// through [`on_request`](Self::on_request) are silent no-ops: background
/// work outside a tracked request must not grow state without bound.
pub struct ContentSecurityPolicyListener {
    report: DirectiveSet,
    enforce: DirectiveSet,
    nonce_generator: NonceGenerator,
    sha_computer: ShaComputer,
    compat_headers: bool,
    content_types: Vec<String>,
    hosts: Vec<String>,
    classifier: Arc<dyn UserAgentClassifier>,
    states: DashMap<Uuid, SignatureState>,
}

impl ContentSecurityPolicyListener {
    pub fn from_config(config: &CspConfig) -> Result<Self> {
        Ok(Self {
            report: DirectiveSet::from_config(&config.policy, PolicyKind::ReportOnly)?,
            enforce: DirectiveSet::from_config(&config.policy, PolicyKind::Enforce)?,
            nonce_generator: NonceGenerator::default(),
            sha_computer: ShaComputer::from_name(&config.hash)?,
            compat_headers: config.compat_headers,
            content_types: config.content_types.clone(),
            hosts: config.hosts.clone(),
            classifier: Arc::new(DefaultUserAgentClassifier),
            states: DashMap::new(),
        })
    }

    /// Replace the browser classifier, e.g. with the hosting framework's own.
    pub fn with_classifier(mut self, classifier: Arc<dyn UserAgentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Request-start hook: start tracking signatures for this request.
    pub fn on_request(&self, req: &Request) {
        if req.is_sub_request() {
            return;
        }
        self.states.insert(req.id(), SignatureState::default());
    }

    /// Register an inline `<script>` block; its hash will be emitted under
    /// script-src. Malformed input (zero or several script tags) is a
    /// template bug and fails loudly.
    pub fn add_script(&self, req: &Request, html: &str) -> Result<()> {
        if !self.states.contains_key(&req.id()) {
            return Ok(());
        }
        let sha = self.sha_computer.compute_for_script(html)?;
        self.push_sha(req, DirectiveName::ScriptSrc, sha);
        Ok(())
    }

    /// Register an inline `<style>` block under style-src.
    pub fn add_style(&self, req: &Request, html: &str) -> Result<()> {
        if !self.states.contains_key(&req.id()) {
            return Ok(());
        }
        let sha = self.sha_computer.compute_for_style(html)?;
        self.push_sha(req, DirectiveName::StyleSrc, sha);
        Ok(())
    }

    /// Register a pre-computed signature token for a directive.
    pub fn add_sha(&self, req: &Request, directive: &str, sha: String) -> Result<()> {
        let directive = DirectiveName::from_name(directive)?;
        self.push_sha(req, directive, sha);
        Ok(())
    }

    /// Get the nonce for `usage` ("script" or "style"). Repeated calls
    /// within one request return the same value. Any other usage string is
    /// a programming error.
    pub fn get_nonce(&self, req: &Request, usage: &str) -> Result<String> {
        if usage != "script" && usage != "style" {
            return Err(Error::InvalidNonceUsage(usage.to_string()));
        }
        if let Some(mut state) = self.states.get_mut(&req.id()) {
            let slot = if usage == "script" {
                &mut state.script_nonce
            } else {
                &mut state.style_nonce
            };
            if let Some(nonce) = slot {
                return Ok(nonce.clone());
            }
            let nonce = self.nonce_generator.generate();
            *slot = Some(nonce.clone());
            Ok(nonce)
        } else {
            // Untracked request: hand out a usable value, retain nothing
            Ok(self.nonce_generator.generate())
        }
    }

    /// Response hook: attach the policy headers and drop per-request state.
    pub fn on_response(&self, req: &Request, res: &mut Response) {
        if req.is_sub_request() {
            return;
        }
        let state = self.states.remove(&req.id()).map(|(_, state)| state);

        // CSP headers on redirects are pointless and would leak policy details
        if res.is_redirect() {
            return;
        }
        if !self.content_type_allowed(res) || !self.host_allowed(req) {
            return;
        }

        let family = self.classifier.classify(req.user_agent());
        let allowed = PolicyManager::allowed_directives(family);
        let signatures = state.map(SignatureState::into_signatures);

        self.attach(res, &self.enforce, HEADER_ENFORCE, HEADER_ENFORCE_COMPAT, |set| {
            set.build_header_value(allowed, signatures.as_ref())
        });
        self.attach(res, &self.report, HEADER_REPORT, HEADER_REPORT_COMPAT, |set| {
            set.build_header_value(allowed, signatures.as_ref())
        });
    }

    fn push_sha(&self, req: &Request, directive: DirectiveName, sha: String) {
        if let Some(mut state) = self.states.get_mut(&req.id()) {
            state.sha.entry(directive).or_default().push(sha);
        }
    }

    fn attach<F>(&self, res: &mut Response, set: &DirectiveSet, primary: &str, compat: &str, build: F)
    where
        F: Fn(&DirectiveSet) -> String,
    {
        let value = build(set);
        if value.is_empty() {
            return;
        }
        // A header set by application code is never overwritten
        if !res.has_header(primary) {
            res.add_header(primary, &value);
        }
        if self.compat_headers && !res.has_header(compat) {
            res.add_header(compat, &value);
        }
    }

    fn content_type_allowed(&self, res: &Response) -> bool {
        if self.content_types.is_empty() {
            return true;
        }
        match res.content_type() {
            Some(content_type) => self.content_types.iter().any(|t| t == content_type),
            None => false,
        }
    }

    fn host_allowed(&self, req: &Request) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        match req.host() {
            Some(host) => self.hosts.iter().any(|h| h == host),
            None => false,
        }
    }
}

#[async_trait]
impl InboundMiddleware for ContentSecurityPolicyListener {
    async fn process_request(&self, req: &Request) -> Result<InboundAction> {
        self.on_request(req);
        Ok(InboundAction::Capture)
    }

    fn name(&self) -> &'static str {
        "csp"
    }

    fn priority(&self) -> i32 {
        -700
    }

    fn should_run(&self, req: &Request) -> bool {
        !req.is_sub_request()
    }
}

#[async_trait]
impl OutboundMiddleware for ContentSecurityPolicyListener {
    async fn process_response(&self, req: &Request, res: &mut Response) -> Result<()> {
        self.on_response(req, res);
        Ok(())
    }
}
