//! URL handling module for Sitegraph
//!
//! This module provides URL canonicalization, the origin boundary check, and
//! the mapping from canonical URLs to local storage paths.

mod normalize;
mod origin;
mod path_map;

// Re-export main functions
pub use normalize::{canonicalize, canonicalize_url};
pub use origin::{is_allowed_origin, Origin};
pub use path_map::{local_path_for, normalize_query, query_hash, LocalPath};
