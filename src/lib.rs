//! cspguard - Content-Security-Policy middleware toolkit
//!
//! cspguard provides the security-header plumbing a web application needs
//! around CSP:
//! - A directive model that renders per-request policy headers, filtered by
//!   what the requesting browser actually understands
//! - Nonce and hash signatures for inline scripts and styles
//! - A violation-report endpoint with noise filtering for the reports that
//!   browsers, extensions and adware generate but operators cannot act on
//!
//! The hosting framework stays external: it delivers requests and responses
//! through the dual-phase middleware seam in [`middleware`].

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod csp;
pub mod error;
pub mod http;
pub mod middleware;
pub mod report;

// Re-export main types for public API
pub use csp::{
    BrowserFamily, ContentSecurityPolicyListener, CspConfig, DefaultUserAgentClassifier,
    DirectiveName, DirectiveSet, NonceGenerator, PolicyConfig, PolicyKind, PolicyManager,
    ShaComputer, UserAgentClassifier,
};
pub use error::{Error, Result};
pub use http::{Request, RequestKind, Response};
pub use middleware::{InboundAction, InboundMiddleware, MiddlewareRegistry, OutboundMiddleware};
pub use report::{Filter, LogFormatter, Logger, NoiseDetector, Report, ViolationReportEndpoint};

// Re-export commonly used external types
pub use serde::{Deserialize, Serialize};
pub use serde_json::{json, Value};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::csp::{
        BrowserFamily, ContentSecurityPolicyListener, CspConfig, DirectiveName, DirectiveSet,
        PolicyConfig, PolicyKind, PolicyManager, ShaComputer,
    };
    pub use crate::error::{Error, Result};
    pub use crate::http::{Request, RequestKind, Response};
    pub use crate::middleware::{
        InboundAction, InboundMiddleware, MiddlewareRegistry, OutboundMiddleware,
    };
    pub use crate::report::{Filter, Logger, Report, ViolationReportEndpoint};
    pub use serde_json::json;
}
