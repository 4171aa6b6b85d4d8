//! End-to-end tests for the CSP listener: full request/response cycles
//! through the middleware seam, browser capability filtering and signature
//! injection.

use cspguard::csp::directives::DirectiveEntry;
use cspguard::csp::listener::{HEADER_ENFORCE, HEADER_REPORT};
use cspguard::prelude::*;

const CHROME_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SAFARI_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
    (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

fn listener_with(directives: &[(&str, &str)]) -> ContentSecurityPolicyListener {
    let mut config = CspConfig {
        hash: "sha256".to_string(),
        ..Default::default()
    };
    for (name, value) in directives {
        config
            .policy
            .enforce
            .insert(name.to_string(), DirectiveEntry::Value(value.to_string()));
    }
    ContentSecurityPolicyListener::from_config(&config).unwrap()
}

fn request_with_ua(ua: &str) -> Request {
    Request::new("GET", "/").with_header("User-Agent", ua)
}

#[tokio::test]
async fn test_full_cycle_through_middleware_traits() {
    let listener = listener_with(&[("default-src", "'self'"), ("object-src", "'none'")]);
    let req = request_with_ua(CHROME_UA);

    let action = listener.process_request(&req).await.unwrap();
    assert!(matches!(action, InboundAction::Capture));

    let mut res = Response::html("<p>hello</p>");
    listener.process_response(&req, &mut res).await.unwrap();

    assert_eq!(
        res.header(HEADER_ENFORCE),
        Some("default-src 'self'; object-src 'none'")
    );
    assert!(!res.has_header(HEADER_REPORT));
}

#[tokio::test]
async fn test_worker_src_filtered_for_safari_but_kept_for_chrome() {
    let listener = listener_with(&[("default-src", "'self'"), ("worker-src", "'none'")]);

    let chrome = request_with_ua(CHROME_UA);
    listener.process_request(&chrome).await.unwrap();
    let mut res = Response::html("<p>ok</p>");
    listener.process_response(&chrome, &mut res).await.unwrap();
    assert!(res.header(HEADER_ENFORCE).unwrap().contains("worker-src 'none'"));

    let safari = request_with_ua(SAFARI_UA);
    listener.process_request(&safari).await.unwrap();
    let mut res = Response::html("<p>ok</p>");
    listener.process_response(&safari, &mut res).await.unwrap();
    let header = res.header(HEADER_ENFORCE).unwrap();
    assert!(!header.contains("worker-src"));
    assert!(header.contains("default-src 'self'"));
}

#[tokio::test]
async fn test_redirect_gets_no_csp_headers() {
    let listener = listener_with(&[("default-src", "'self'")]);
    let req = request_with_ua(CHROME_UA);
    listener.process_request(&req).await.unwrap();

    let mut res = Response::redirect("/login");
    listener.process_response(&req, &mut res).await.unwrap();

    assert!(!res.has_header(HEADER_ENFORCE));
    assert!(!res.has_header(HEADER_REPORT));
    assert!(!res.has_header("X-Content-Security-Policy"));
}

#[tokio::test]
async fn test_manually_set_header_is_preserved() {
    let listener = listener_with(&[("default-src", "'self'")]);
    let req = request_with_ua(CHROME_UA);
    listener.process_request(&req).await.unwrap();

    let mut res =
        Response::html("<p>ok</p>").with_header(HEADER_ENFORCE, "default-src 'none'");
    listener.process_response(&req, &mut res).await.unwrap();

    let values: Vec<_> = res
        .headers
        .iter()
        .filter(|(k, _)| k == HEADER_ENFORCE)
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(values, vec!["default-src 'none'"]);
}

#[tokio::test]
async fn test_inline_signatures_render_per_request() {
    let listener = listener_with(&[("default-src", "'self'")]);
    let req = request_with_ua(CHROME_UA);
    listener.process_request(&req).await.unwrap();

    listener
        .add_script(&req, "<script>console.log('hello world!');</script>")
        .unwrap();
    listener
        .add_style(&req, "<style>body { margin: 0 }</style>")
        .unwrap();
    let nonce = listener.get_nonce(&req, "script").unwrap();
    assert_eq!(nonce, listener.get_nonce(&req, "script").unwrap());

    let mut res = Response::html("<p>ok</p>");
    listener.process_response(&req, &mut res).await.unwrap();

    let header = res.header(HEADER_ENFORCE).unwrap();
    assert!(header.contains("default-src 'self'"));
    assert!(header.contains("script-src 'self' 'unsafe-inline'"));
    assert!(header.contains("'sha256-lClGOfcWqtQdAvO3zCRzZEg/4RmOMbr9/V54QO76j/A='"));
    assert!(header.contains(&format!("'nonce-{}'", nonce)));
    assert!(header.contains("style-src 'self' 'unsafe-inline' 'sha256-"));

    // State was dropped with the response; a new request starts clean
    let second = request_with_ua(CHROME_UA);
    listener.process_request(&second).await.unwrap();
    let mut res = Response::html("<p>ok</p>");
    listener.process_response(&second, &mut res).await.unwrap();
    assert_eq!(res.header(HEADER_ENFORCE), Some("default-src 'self'"));
}

#[tokio::test]
async fn test_concurrent_requests_do_not_share_signatures() {
    use std::sync::Arc;
    let listener = Arc::new(listener_with(&[("default-src", "'self'")]));

    let req_a = request_with_ua(CHROME_UA);
    let req_b = request_with_ua(CHROME_UA);
    listener.process_request(&req_a).await.unwrap();
    listener.process_request(&req_b).await.unwrap();

    let nonce_a = listener.get_nonce(&req_a, "script").unwrap();
    let nonce_b = listener.get_nonce(&req_b, "script").unwrap();
    assert_ne!(nonce_a, nonce_b);

    let mut res_a = Response::html("<p>a</p>");
    listener.process_response(&req_a, &mut res_a).await.unwrap();
    let mut res_b = Response::html("<p>b</p>");
    listener.process_response(&req_b, &mut res_b).await.unwrap();

    assert!(res_a
        .header(HEADER_ENFORCE)
        .unwrap()
        .contains(&format!("'nonce-{}'", nonce_a)));
    assert!(res_b
        .header(HEADER_ENFORCE)
        .unwrap()
        .contains(&format!("'nonce-{}'", nonce_b)));
}

#[tokio::test]
async fn test_report_only_policy_renders_separately() {
    let mut config = CspConfig {
        hash: "sha256".to_string(),
        ..Default::default()
    };
    config.policy.enforce.insert(
        "default-src".to_string(),
        DirectiveEntry::Value("'self'".to_string()),
    );
    config.policy.report.insert(
        "default-src".to_string(),
        DirectiveEntry::Value("'self' https:".to_string()),
    );
    config.policy.report.insert(
        "report-uri".to_string(),
        DirectiveEntry::Value("/csp/report".to_string()),
    );
    let listener = ContentSecurityPolicyListener::from_config(&config).unwrap();

    let req = request_with_ua(CHROME_UA);
    listener.process_request(&req).await.unwrap();
    let mut res = Response::html("<p>ok</p>");
    listener.process_response(&req, &mut res).await.unwrap();

    assert_eq!(res.header(HEADER_ENFORCE), Some("default-src 'self'"));
    assert_eq!(
        res.header(HEADER_REPORT),
        Some("default-src 'self' https:; report-uri /csp/report")
    );
}

#[test]
fn test_unknown_directive_fails_at_construction() {
    let mut config = CspConfig::default();
    config.policy.enforce.insert(
        "script-sources".to_string(),
        DirectiveEntry::Value("'self'".to_string()),
    );
    config.hash = "sha256".to_string();
    assert!(ContentSecurityPolicyListener::from_config(&config).is_err());
}

#[test]
fn test_unknown_hash_algorithm_fails_at_construction() {
    let config = CspConfig {
        hash: "md5".to_string(),
        ..Default::default()
    };
    assert!(ContentSecurityPolicyListener::from_config(&config).is_err());
}

#[tokio::test]
async fn test_registered_dual_listener_shares_state_across_phases() {
    use std::sync::Arc;
    let listener = Arc::new(listener_with(&[("default-src", "'self'")]));
    let mut registry = MiddlewareRegistry::new();
    registry.register_dual("csp", listener.clone());

    let instances = registry.get_sorted();
    assert_eq!(instances.len(), 1);
    let instance = instances[0];
    assert!(instance.has_inbound());
    assert!(instance.has_outbound());
    assert_eq!(instance.priority, -700);

    let req = request_with_ua(CHROME_UA);
    let inbound = instance.inbound.as_ref().unwrap();
    assert!(matches!(
        inbound.process_request(&req).await.unwrap(),
        InboundAction::Capture
    ));

    // Rendering happens between the phases; the nonce handed out here must
    // reach the header assembled by the outbound phase
    let nonce = listener.get_nonce(&req, "script").unwrap();

    let mut res = Response::html("<p>ok</p>");
    let outbound = instance.outbound.as_ref().unwrap();
    outbound.process_response(&req, &mut res).await.unwrap();

    let header = res.header(HEADER_ENFORCE).unwrap();
    assert!(header.contains(&format!("'nonce-{}'", nonce)));
}
