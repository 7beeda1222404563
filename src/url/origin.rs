use crate::config::OriginConfig;
use url::Url;

/// The (host, port) pair bounding a crawl
///
/// A URL belongs to the origin when its host matches and its port, explicit
/// or implied by the scheme (80 for http, 443 for https), matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    host: String,
    port: u16,
}

impl Origin {
    /// Creates an origin from a host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: normalize_host(&host.into()),
            port,
        }
    }

    /// Builds the origin from configuration
    pub fn from_config(config: &OriginConfig) -> Self {
        Self::new(config.host.as_str(), config.port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns true if `url` is inside this origin
    pub fn allows(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        if normalize_host(host) != self.host {
            return false;
        }

        url.port_or_known_default() == Some(self.port)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Checks whether `url` lies within the allowed origin
pub fn is_allowed_origin(url: &Url, origin: &Origin) -> bool {
    origin.allows(url)
}

/// Lowercases a host and strips IPv6 brackets
fn normalize_host(host: &str) -> String {
    host.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin::new("127.0.0.1", 8000)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_matching_host_and_port() {
        assert!(origin().allows(&url("http://127.0.0.1:8000/index.html")));
        assert!(origin().allows(&url("https://127.0.0.1:8000/")));
    }

    #[test]
    fn test_wrong_port() {
        assert!(!origin().allows(&url("http://127.0.0.1:8001/index.html")));
    }

    #[test]
    fn test_wrong_host() {
        assert!(!origin().allows(&url("http://localhost:8000/index.html")));
        assert!(!origin().allows(&url("http://example.com:8000/")));
    }

    #[test]
    fn test_default_ports() {
        let http = Origin::new("example.com", 80);
        assert!(http.allows(&url("http://example.com/page")));
        assert!(!http.allows(&url("https://example.com/page")));

        let https = Origin::new("example.com", 443);
        assert!(https.allows(&url("https://example.com/page")));
        assert!(!https.allows(&url("http://example.com/page")));
    }

    #[test]
    fn test_host_case_insensitive() {
        let origin = Origin::new("LocalHost", 3000);
        assert!(origin.allows(&url("http://localhost:3000/")));
    }

    #[test]
    fn test_ipv6_host() {
        let origin = Origin::new("[::1]", 8080);
        assert!(origin.allows(&url("http://[::1]:8080/a")));
        assert_eq!(origin.to_string(), "[::1]:8080");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(!origin().allows(&url("mailto:admin@127.0.0.1")));
    }

    #[test]
    fn test_is_allowed_origin() {
        assert!(is_allowed_origin(
            &url("http://127.0.0.1:8000/a"),
            &origin()
        ));
        assert!(!is_allowed_origin(&url("http://10.0.0.1:8000/a"), &origin()));
    }
}
