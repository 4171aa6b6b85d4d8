//! Content-Security-Policy subsystem: directive model, browser capability
//! tables, inline-content signatures and the per-request listener.

pub mod directives;
pub mod listener;
pub mod nonce;
pub mod parser;
pub mod policy;
pub mod sha;

pub use directives::{
    DirectiveEntry, DirectiveName, DirectiveSet, DirectiveType, DirectiveValue, PolicyConfig,
    PolicyKind,
};
pub use listener::{ContentSecurityPolicyListener, CspConfig};
pub use nonce::NonceGenerator;
pub use parser::parse_source_list;
pub use policy::{BrowserFamily, DefaultUserAgentClassifier, PolicyManager, UserAgentClassifier};
pub use sha::{HashAlgorithm, ShaComputer};
