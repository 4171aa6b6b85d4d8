//! Content hashing for inline scripts and styles.
//!
//! A hash signature authorizes one exact inline block, so the input must
//! contain exactly one `<script>`/`<style>` pair. Zero or multiple blocks
//! indicate a template bug that would silently break the page's CSP, hence
//! the loud error.

use crate::error::{Error, Result};
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256, Sha384, Sha512};

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script\s*>").expect("static regex")
});
static STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style[^>]*>(.*?)</style\s*>").expect("static regex")
});

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::InvalidHashAlgorithm(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

/// Computes `<algo>-<base64(hash)>` signatures for inline content.
#[derive(Debug, Clone)]
pub struct ShaComputer {
    algorithm: HashAlgorithm,
}

impl Default for ShaComputer {
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha256)
    }
}

impl ShaComputer {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(HashAlgorithm::from_name(name)?))
    }

    /// Hash the inner content of the single `<script>...</script>` block in
    /// `html`. Attributes on the opening tag are ignored.
    pub fn compute_for_script(&self, html: &str) -> Result<String> {
        self.compute_wrapped(html, &SCRIPT_RE, "script")
    }

    /// Hash the inner content of the single `<style>...</style>` block.
    pub fn compute_for_style(&self, html: &str) -> Result<String> {
        self.compute_wrapped(html, &STYLE_RE, "style")
    }

    fn compute_wrapped(&self, html: &str, pattern: &Regex, tag: &str) -> Result<String> {
        let mut contents = pattern.captures_iter(html);
        let inner = match (contents.next(), contents.next()) {
            (Some(captures), None) => captures
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or_default(),
            (None, _) => {
                return Err(Error::invalid_input(format!(
                    "expected a single <{}> tag, found none",
                    tag
                )));
            }
            (Some(_), Some(_)) => {
                return Err(Error::invalid_input(format!(
                    "expected a single <{}> tag, found several",
                    tag
                )));
            }
        };
        Ok(self.compute(inner))
    }

    /// Hash raw content directly, without tag extraction.
    pub fn compute(&self, content: &str) -> String {
        let digest = match self.algorithm {
            HashAlgorithm::Sha256 => Sha256::digest(content.as_bytes()).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(content.as_bytes()).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(content.as_bytes()).to_vec(),
        };
        format!(
            "{}-{}",
            self.algorithm.as_str(),
            general_purpose::STANDARD.encode(digest)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        let computer = ShaComputer::default();
        assert_eq!(
            computer
                .compute_for_script("<script>console.log('hello world!');</script>")
                .unwrap(),
            "sha256-lClGOfcWqtQdAvO3zCRzZEg/4RmOMbr9/V54QO76j/A="
        );
    }

    #[test]
    fn test_tag_matching_is_case_insensitive_and_ignores_attributes() {
        let computer = ShaComputer::default();
        let plain = computer
            .compute_for_script("<script>console.log('hello world!');</script>")
            .unwrap();
        let decorated = computer
            .compute_for_script("<SCRIPT type=\"text/javascript\">console.log('hello world!');</SCRIPT>")
            .unwrap();
        assert_eq!(plain, decorated);
    }

    #[test]
    fn test_zero_tags_is_an_error() {
        let computer = ShaComputer::default();
        assert!(computer.compute_for_script("console.log('x');").is_err());
    }

    #[test]
    fn test_multiple_tags_is_an_error() {
        let computer = ShaComputer::default();
        let err = computer
            .compute_for_script("<script>a();</script><script>b();</script>")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_style_blocks() {
        let computer = ShaComputer::default();
        let sig = computer
            .compute_for_style("<style>body { color: red; }</style>")
            .unwrap();
        assert!(sig.starts_with("sha256-"));
        assert!(computer.compute_for_style("<div>no style</div>").is_err());
    }

    #[test]
    fn test_multiline_content_is_hashed_whole() {
        let computer = ShaComputer::default();
        let sig = computer
            .compute_for_script("<script>\nvar a = 1;\nvar b = 2;\n</script>")
            .unwrap();
        assert_eq!(sig, computer.compute("\nvar a = 1;\nvar b = 2;\n"));
    }

    #[test]
    fn test_unknown_algorithm_fails_fast() {
        assert!(matches!(
            HashAlgorithm::from_name("md5"),
            Err(Error::InvalidHashAlgorithm(_))
        ));
        assert!(HashAlgorithm::from_name("sha384").is_ok());
    }
}
