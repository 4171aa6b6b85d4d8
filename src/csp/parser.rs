//! Source-list rendering for CSP directives.

/// Reserved CSP keyword tokens that must appear single-quoted in a header.
const KEYWORDS: &[&str] = &[
    "self",
    "unsafe-inline",
    "unsafe-eval",
    "wasm-unsafe-eval",
    "strict-dynamic",
    "unsafe-hashes",
    "report-sample",
    "unsafe-allow-redirects",
    "none",
];

/// Render a source list to its header form: reserved keywords get wrapped in
/// single quotes, everything else (hostnames, schemes, pre-quoted nonce-/sha-
/// tokens) passes through untouched. Tokens are joined with single spaces.
pub fn parse_source_list<I, S>(sources: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sources
        .into_iter()
        .map(|source| quote_keyword(source.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_keyword(source: &str) -> String {
    if KEYWORDS.contains(&source) {
        format!("'{}'", source)
    } else {
        source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_quoted() {
        assert_eq!(
            parse_source_list(["self", "unsafe-inline", "example.com"]),
            "'self' 'unsafe-inline' example.com"
        );
    }

    #[test]
    fn test_non_keywords_pass_through() {
        assert_eq!(
            parse_source_list(["https:", "data:", "*.example.org"]),
            "https: data: *.example.org"
        );
    }

    #[test]
    fn test_already_quoted_tokens_are_untouched() {
        assert_eq!(
            parse_source_list(["'nonce-abc123'", "'sha256-xyz='"]),
            "'nonce-abc123' 'sha256-xyz='"
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(parse_source_list(Vec::<&str>::new()), "");
    }
}
