//! Output module for crawl artifacts and reports
//!
//! This module handles:
//! - Writing and reading the index file
//! - Recording and printing crawl statistics
//! - Verifying stored pages against an index
//! - Summarizing an existing index

mod index;
pub mod stats;
mod summary;
mod verify;

pub use index::{read_index, write_index, CrawlIndex, IndexedNode};
pub use stats::{print_statistics, CrawlStatistics, StatsRecorder};
pub use summary::{print_summary, summarize_index, IndexSummary};
pub use verify::{verify_index, write_missing_seeds, VerificationReport, MISSING_SEEDS_FILE};
