use std::collections::HashMap;
use uuid::Uuid;

/// Whether a request is a top-level request or an internal sub-request
/// (forwarded include, error-page render, ...). Listeners only act on
/// main requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    #[default]
    Main,
    Sub,
}

/// A minimal view of an incoming HTTP request.
///
/// The hosting framework owns the real request object; this seam carries
/// only what the security listeners need: a header bag, the body bytes,
/// the main/sub flag and a per-request identity used to key request-scoped
/// state.
#[derive(Debug, Clone)]
pub struct Request {
    id: Uuid,
    pub method: String,
    pub uri: String,
    pub headers: HashMap<String, String>,
    pub kind: RequestKind,
    body_bytes: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new("GET", "/")
    }
}

impl Request {
    pub fn new(method: &str, uri: &str) -> Self {
        Request {
            id: Uuid::new_v4(),
            method: method.to_string(),
            uri: uri.to_string(),
            headers: HashMap::new(),
            kind: RequestKind::Main,
            body_bytes: Vec::new(),
        }
    }

    /// Stable identity of this request, used to key request-scoped state.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_sub_request(&self) -> bool {
        self.kind == RequestKind::Sub
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    /// Request host, from the Host header
    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).to_string()
    }

    /// Set body for testing purposes
    #[doc(hidden)]
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body_bytes = body;
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_kind(mut self, kind: RequestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body_bytes = body;
        self
    }
}
