//! URL canonicalization into identity keys.

use url::Url;

use crate::IdentityKey;

/// Turns a request URL into the identity key shared by all registries.
///
/// Implementations must strip the query and fragment so requests that only
/// differ in parameters share an identity; parameters are compared separately
/// by the cache layer.
pub trait Canonicalize: Send + Sync {
    /// Returns the identity key for `url`.
    fn canonicalize(&self, url: &str) -> IdentityKey;
}

impl<F> Canonicalize for F
where
    F: Fn(&str) -> IdentityKey + Send + Sync,
{
    fn canonicalize(&self, url: &str) -> IdentityKey {
        self(url)
    }
}

/// Default canonicalizer: `origin + path`, with relative URLs resolved
/// against an optional base.
///
/// ```
/// use tollgate_core::{Canonicalize, UrlCanonicalizer};
///
/// let canonicalizer = UrlCanonicalizer::new();
/// assert_eq!(
///     canonicalizer.canonicalize("https://example.com/api/user?id=1#top").as_str(),
///     "https://example.com/api/user",
/// );
/// assert_eq!(canonicalizer.canonicalize("/api/submit?x=1").as_str(), "/api/submit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlCanonicalizer {
    base: Option<Url>,
}

impl UrlCanonicalizer {
    /// Canonicalizer without a base; relative URLs keep their path only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizer resolving relative URLs against `base`.
    pub fn with_base(base: Url) -> Self {
        Self { base: Some(base) }
    }

    fn resolve(&self, url: &str) -> Option<Url> {
        match Url::parse(url) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base.as_ref().and_then(|base| base.join(url).ok())
            }
            Err(_) => None,
        }
    }
}

impl Canonicalize for UrlCanonicalizer {
    fn canonicalize(&self, url: &str) -> IdentityKey {
        match self.resolve(url) {
            Some(url) if url.origin().is_tuple() => {
                IdentityKey::from(format!("{}{}", url.origin().ascii_serialization(), url.path()))
            }
            Some(url) => IdentityKey::from(format!("{}:{}", url.scheme(), url.path())),
            None => IdentityKey::new(strip_query(url)),
        }
    }
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url() {
        let canonicalizer = UrlCanonicalizer::new();
        let key = canonicalizer.canonicalize("HTTPS://Example.com:443/api/user?id=1");
        assert_eq!(key, "https://example.com/api/user");
    }

    #[test]
    fn test_non_default_port_kept() {
        let canonicalizer = UrlCanonicalizer::new();
        let key = canonicalizer.canonicalize("http://localhost:8080/api/user#frag");
        assert_eq!(key, "http://localhost:8080/api/user");
    }

    #[test]
    fn test_relative_with_base() {
        let base = Url::parse("https://example.com/app/").unwrap();
        let canonicalizer = UrlCanonicalizer::with_base(base);
        assert_eq!(
            canonicalizer.canonicalize("api/user?id=1"),
            "https://example.com/app/api/user"
        );
        assert_eq!(
            canonicalizer.canonicalize("/api/user"),
            "https://example.com/api/user"
        );
    }

    #[test]
    fn test_relative_without_base() {
        let canonicalizer = UrlCanonicalizer::new();
        assert_eq!(canonicalizer.canonicalize("/api/submit?id=1"), "/api/submit");
        assert_eq!(canonicalizer.canonicalize("/api/submit#x"), "/api/submit");
    }

    #[test]
    fn test_closure_canonicalizer() {
        let canonicalizer = |url: &str| IdentityKey::new(url.to_lowercase());
        assert_eq!(canonicalizer.canonicalize("/API"), "/api");
    }
}
