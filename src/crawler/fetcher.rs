//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with user agent, timeouts, and redirect policy
//! - Gating in-flight requests with a global semaphore
//! - Retry with linear backoff for transient failures
//! - Status and Content-Type acceptance checks
//! - Error classification

use crate::config::Config;
use crate::state::RejectReason;
use crate::url::Origin;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Upper bound for the connect phase; the request timeout still applies
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Content types accepted as HTML
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code (always 200)
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body exactly as received
        body: Vec<u8>,
        /// Number of attempts made, including this one
        attempts: u32,
    },

    /// Response status was not 200
    HttpStatus {
        /// The HTTP status code
        status_code: u16,
        /// Number of attempts made
        attempts: u32,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// A redirect pointed outside the allowed origin and was not followed
    RedirectOutsideOrigin {
        /// The refused redirect target
        location: String,
    },

    /// Redirect error (loop, too many redirects)
    RedirectError {
        /// Error description
        error: String,
    },

    /// Network error (connection refused, timeout, etc.) on every attempt
    NetworkError {
        /// Error description of the last attempt
        error: String,
        /// Number of attempts made
        attempts: u32,
    },
}

/// Body and final location of an accepted response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,

    /// Raw response bytes; stored without transformation
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body decoded for parsing; invalid UTF-8 sequences become U+FFFD
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl FetchOutcome {
    /// Number of HTTP exchanges this outcome took
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::HttpStatus { attempts, .. }
            | Self::NetworkError { attempts, .. } => *attempts,
            _ => 1,
        }
    }

    /// Returns the page on success, `None` for every failure
    pub fn into_page(self) -> Option<FetchedPage> {
        match self {
            Self::Success {
                final_url, body, ..
            } => Some(FetchedPage { final_url, body }),
            _ => None,
        }
    }

    /// Converts the outcome into a page or the reason it was rejected
    pub fn into_result(self) -> Result<FetchedPage, RejectReason> {
        match self {
            Self::Success {
                final_url, body, ..
            } => Ok(FetchedPage { final_url, body }),
            Self::HttpStatus { status_code, .. } => Err(RejectReason::HttpStatus(status_code)),
            Self::ContentMismatch { content_type } => Err(RejectReason::ContentType(content_type)),
            Self::RedirectOutsideOrigin { .. } => Err(RejectReason::OriginViolation),
            Self::RedirectError { .. } | Self::NetworkError { .. } => Err(RejectReason::Transport),
        }
    }
}

/// Failure of a single attempt that is worth retrying
#[derive(Debug)]
enum TransientFailure {
    Transport(String),
    ServerError(u16),
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed automatically up to ten hops, but never across the
/// origin boundary: a hop leaving `origin` stops the chain and the 3xx
/// response is returned to the caller as-is.
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::Config;
/// use sitegraph::crawler::build_http_client;
/// use sitegraph::url::Origin;
///
/// let config = Config::default();
/// let client = build_http_client(&config, Origin::from_config(&config.origin)).unwrap();
/// ```
pub fn build_http_client(config: &Config, origin: Origin) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error(format!("more than {} redirects", MAX_REDIRECTS))
        } else if attempt.previous().contains(attempt.url()) {
            attempt.error("redirect loop")
        } else if !origin.allows(attempt.url()) {
            attempt.stop()
        } else {
            attempt.follow()
        }
    });

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for `text/html` and `application/xhtml+xml`
///
/// Parameters such as `charset` are ignored, as is letter case.
pub fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    HTML_CONTENT_TYPES
        .iter()
        .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
}

/// Fetches pages with retry logic under a shared concurrency gate
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 + HTML | Success |
/// | HTTP 200 + other type | Immediate → ContentMismatch |
/// | HTTP 5xx | Retry, then HttpStatus |
/// | Other HTTP status | Immediate → HttpStatus |
/// | Timeout / connection error | Retry, then NetworkError |
/// | Redirect outside origin | Immediate → RedirectOutsideOrigin |
/// | Redirect loop / chain > 10 | Immediate → RedirectError |
///
/// Attempt `n` that fails transiently sleeps `n * retry_base_delay` before
/// attempt `n + 1`. The semaphore permit is held only for the HTTP exchange
/// itself, never while sleeping.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    origin: Origin,
    semaphore: Arc<Semaphore>,
    retry_limit: u32,
    retry_base_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher for the configured origin
    pub fn new(config: &Config, origin: Origin) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config, origin.clone())?;

        Ok(Self {
            client,
            origin,
            semaphore: Arc::new(Semaphore::new(config.crawler.max_concurrency as usize)),
            retry_limit: config.crawler.retry_limit.max(1),
            retry_base_delay: Duration::from_millis(config.crawler.retry_base_delay_ms),
        })
    }

    /// Number of request slots currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// Never fails: every problem is reported through [`FetchOutcome`].
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let failure = match self.attempt(url, attempt).await {
                Ok(outcome) => return outcome,
                Err(failure) => failure,
            };

            if attempt >= self.retry_limit {
                tracing::debug!(
                    "Giving up on {} after {} attempts: {:?}",
                    url,
                    attempt,
                    failure
                );
                return match failure {
                    TransientFailure::Transport(error) => FetchOutcome::NetworkError {
                        error,
                        attempts: attempt,
                    },
                    TransientFailure::ServerError(status_code) => FetchOutcome::HttpStatus {
                        status_code,
                        attempts: attempt,
                    },
                };
            }

            let delay = self.retry_base_delay * attempt;
            tracing::debug!(
                "Attempt {}/{} for {} failed ({:?}), retrying in {:?}",
                attempt,
                self.retry_limit,
                url,
                failure,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Performs one HTTP exchange under a semaphore permit
    async fn attempt(&self, url: &Url, attempt: u32) -> Result<FetchOutcome, TransientFailure> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| TransientFailure::Transport(e.to_string()))?;

        tracing::trace!("GET {} (attempt {})", url, attempt);

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_redirect() => {
                return Ok(FetchOutcome::RedirectError {
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(TransientFailure::Transport(describe_error(&e))),
        };

        let status = response.status();

        if status.is_server_error() {
            return Err(TransientFailure::ServerError(status.as_u16()));
        }

        if status.is_redirection() {
            if let Some(location) = self.refused_redirect(&response) {
                return Ok(FetchOutcome::RedirectOutsideOrigin { location });
            }
        }

        if status != StatusCode::OK {
            return Ok(FetchOutcome::HttpStatus {
                status_code: status.as_u16(),
                attempts: attempt,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Ok(FetchOutcome::ContentMismatch { content_type });
        }

        let final_url = response.url().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransientFailure::Transport(describe_error(&e)))?
            .to_vec();

        Ok(FetchOutcome::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            attempts: attempt,
        })
    }

    /// Returns the Location of a 3xx that the redirect policy refused
    fn refused_redirect(&self, response: &Response) -> Option<String> {
        let location = response.headers().get(LOCATION)?.to_str().ok()?;
        let target = response.url().join(location).ok()?;
        if self.origin.allows(&target) {
            None
        } else {
            Some(target.to_string())
        }
    }
}

/// Classifies a reqwest error into a short description
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
