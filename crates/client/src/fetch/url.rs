//! URL resolution for manifest entries and intercepted requests.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve an absolute or root-relative URL against the app origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative input against `origin`
/// 3. Require http or https
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&origin(), "/static/manifest.json").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/static/manifest.json");
    }

    #[test]
    fn test_resolve_absolute_cdn() {
        let url = resolve(&origin(), "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.jsdelivr.net"));
        assert!(!same_origin(&url, &origin()));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://CDN.Example.COM/x.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/clientes#lista").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/clientes");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/vendas?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin_port_matters() {
        let other_port = Url::parse("http://localhost:5001/").unwrap();
        let same = Url::parse("http://localhost:5000/produtos").unwrap();
        assert!(!same_origin(&other_port, &origin()));
        assert!(same_origin(&same, &origin()));
    }
}
