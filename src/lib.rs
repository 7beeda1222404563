//! Sitegraph: a bounded, single-origin site mirror
//!
//! This crate crawls a locally hosted HTML document tree, stores every
//! reachable page exactly once under a deterministic path, and records the
//! discovered link graph in an index file.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitegraph operations
///
/// Only run-level failures surface through this type. Failures scoped to a
/// single URL are recorded as rejections and never abort a crawl.
#[derive(Debug, Error)]
pub enum SiteGraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to create output root {path}: {source}")]
    OutputRoot {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No seed URLs configured")]
    NoSeeds,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Index file errors
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to access index file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed index file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type alias for Sitegraph operations
pub type Result<T> = std::result::Result<T, SiteGraphError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlReport, PageNode};
pub use state::{PageState, RejectReason};
pub use self::url::{canonicalize, local_path_for, LocalPath, Origin};
