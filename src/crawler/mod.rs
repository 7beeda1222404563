//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic under a concurrency gate
//! - HTML parsing and link extraction
//! - The shared work queue and visited set
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod node;
mod parser;
mod scheduler;

pub use coordinator::{crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, is_html_content_type, FetchOutcome, FetchedPage, Fetcher};
pub use node::{dedup_links, PageNode};
pub use parser::{extract_links, extract_title, parse_html, ParsedPage};
pub use scheduler::{Claim, QueuedUrl, Scheduler};
