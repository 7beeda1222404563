//! Summary of an existing index
//!
//! Used by the `--stats` mode to describe a finished crawl without
//! crawling again.

use crate::output::index::CrawlIndex;
use std::collections::HashSet;

/// Shape of the link graph recorded in an index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Saved pages
    pub pages: usize,

    /// Seeds listed in the index
    pub seeds: usize,

    /// Seeds that were saved as pages
    pub seeds_saved: usize,

    /// Non-seed pages whose parent is not itself a saved page
    pub orphans: usize,

    /// Pages without any links
    pub leaves: usize,

    /// Total child links across all pages
    pub total_links: usize,

    /// Distinct linked URLs that were never saved
    pub unfetched_children: usize,

    /// Longest parent chain from a page back to a root
    pub max_depth: usize,
}

/// Computes an [`IndexSummary`]
///
/// Depth follows `parent` links until a page without a saved parent is
/// reached; seeds have depth zero.
pub fn summarize_index(index: &CrawlIndex) -> IndexSummary {
    let seeds: HashSet<&str> = index.start_urls.iter().map(String::as_str).collect();

    let mut summary = IndexSummary {
        pages: index.nodes.len(),
        seeds: index.start_urls.len(),
        seeds_saved: index
            .start_urls
            .iter()
            .filter(|url| index.nodes.contains_key(*url))
            .count(),
        ..Default::default()
    };

    let mut unfetched = HashSet::new();

    for (url, node) in &index.nodes {
        let has_saved_parent = node
            .parent
            .as_ref()
            .is_some_and(|parent| index.nodes.contains_key(parent));
        if !seeds.contains(url.as_str()) && !has_saved_parent {
            summary.orphans += 1;
        }

        if node.children.is_empty() {
            summary.leaves += 1;
        }
        summary.total_links += node.children.len();

        unfetched.extend(
            node.children
                .iter()
                .filter(|child| !index.nodes.contains_key(*child)),
        );

        summary.max_depth = summary.max_depth.max(depth_of(index, url));
    }

    summary.unfetched_children = unfetched.len();
    summary
}

fn depth_of(index: &CrawlIndex, url: &str) -> usize {
    let mut depth = 0;
    let mut current = url;

    // Bounded by the node count so a malformed parent cycle terminates
    while depth < index.nodes.len() {
        match index
            .nodes
            .get(current)
            .and_then(|node| node.parent.as_deref())
        {
            Some(parent) if index.nodes.contains_key(parent) => {
                depth += 1;
                current = parent;
            }
            _ => break,
        }
    }

    depth
}

/// Prints an index summary to stdout
pub fn print_summary(summary: &IndexSummary) {
    println!("=== Index Summary ===\n");
    println!("Pages saved: {}", summary.pages);
    println!("Seeds: {} ({} saved)", summary.seeds, summary.seeds_saved);
    println!("Links recorded: {}", summary.total_links);
    println!("Linked but not saved: {}", summary.unfetched_children);
    println!("Pages without links: {}", summary.leaves);
    println!("Orphan pages: {}", summary.orphans);
    println!("Max depth: {}", summary.max_depth);
}
