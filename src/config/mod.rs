//! Configuration module for Sitegraph
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus reading seed lists.
//!
//! # Example
//!
//! ```no_run
//! use sitegraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitegraph.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OriginConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use seeds::{clean_seed_values, load_seeds_file, parse_seed_lines};
pub use validation::validate;
