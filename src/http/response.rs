use hyper::StatusCode;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 204 No Content
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// 400 Bad Request
    pub fn bad_request(message: Option<&str>) -> Self {
        let body = message.unwrap_or("Bad Request");
        Self::new(StatusCode::BAD_REQUEST)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.as_bytes().to_vec())
    }

    /// 411 Length Required
    pub fn length_required(message: Option<&str>) -> Self {
        let body = message.unwrap_or("Length Required");
        Self::new(StatusCode::LENGTH_REQUIRED)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.as_bytes().to_vec())
    }

    pub fn redirect(location: &str) -> Self {
        Self::new(StatusCode::FOUND).with_header("Location", location)
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(content.into().into_bytes())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a header to an existing response (mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Case-insensitive header lookup, first match wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn content_type(&self) -> Option<&str> {
        // "text/html; charset=utf-8" -> "text/html"
        self.header("Content-Type")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_is_detected() {
        assert!(Response::redirect("/login").is_redirect());
        assert!(!Response::ok().is_redirect());
    }

    #[test]
    fn test_content_type_strips_parameters() {
        let response = Response::html("<p>hi</p>");
        assert_eq!(response.content_type(), Some("text/html"));
    }

    #[test]
    fn test_status_constructors() {
        assert_eq!(Response::no_content().status, StatusCode::NO_CONTENT);
        assert_eq!(
            Response::length_required(None).status,
            StatusCode::LENGTH_REQUIRED
        );
        assert_eq!(Response::bad_request(None).status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_header_lookup() {
        let response = Response::ok().with_header("X-Test", "1");
        assert!(response.has_header("x-test"));
        assert_eq!(response.header("X-Test"), Some("1"));
    }
}
