//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Lifecycle of a single URL (queued, in flight, saved, rejected)
//! - `RejectReason`: Why a URL was dropped from the graph

mod page_state;
mod reject_reason;

// Re-export main types
pub use page_state::PageState;
pub use reject_reason::RejectReason;
