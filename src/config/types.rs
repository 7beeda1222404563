use serde::Deserialize;

/// Main configuration structure for Sitegraph
///
/// Every section is optional in the TOML file; missing keys fall back to
/// conservative defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Start URLs for the crawl
    pub seeds: Vec<String>,
    pub origin: OriginConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// The single (host, port) pair the crawl is confined to
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    pub host: String,
    pub port: u16,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of worker tasks pulling from the work queue
    pub workers: u32,

    /// Maximum number of HTTP requests in flight at once
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Total attempts per URL on transient failures
    #[serde(rename = "retry-limit")]
    pub retry_limit: u32,

    /// Base backoff delay; attempt `n` waits `n * base` before the next try
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_concurrency: 4,
            request_timeout_secs: 20,
            retry_limit: 3,
            retry_base_delay_ms: 500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving stored pages and the index
    pub root: String,

    /// Index file name, relative to `root`
    #[serde(rename = "index-file")]
    pub index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: "db".to_string(),
            index_file: "index.json".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitegraph".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}
