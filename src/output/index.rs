//! Index file writer and reader
//!
//! The index is the crawl's terminal artifact: the seed list plus every
//! page node, keyed by canonical URL. It is written once, after drain.
//!
//! ```json
//! {
//!   "generated_at": "2024-01-01T00:00:00Z",
//!   "start_urls": ["http://127.0.0.1:8000/index.html"],
//!   "nodes": {
//!     "http://127.0.0.1:8000/index.html": {
//!       "title": "Home",
//!       "local_path": "index.html",
//!       "parent": null,
//!       "children": ["http://127.0.0.1:8000/a.html"]
//!     }
//!   }
//! }
//! ```

use crate::crawler::PageNode;
use crate::IndexError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Persisted form of a crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlIndex {
    /// When the index was written
    pub generated_at: DateTime<Utc>,

    /// Canonical seed URLs, in the order given
    pub start_urls: Vec<String>,

    /// Page nodes keyed by canonical URL
    pub nodes: BTreeMap<String, IndexedNode>,
}

/// One node as stored in the index (the URL is the map key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedNode {
    pub title: Option<String>,
    pub local_path: String,
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

impl From<&PageNode> for IndexedNode {
    fn from(node: &PageNode) -> Self {
        Self {
            title: node.title.clone(),
            local_path: node.local_path.clone(),
            parent: node.parent.clone(),
            children: node.children.clone(),
        }
    }
}

impl CrawlIndex {
    /// Builds an index from the final node set
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a PageNode>, start_urls: &[String]) -> Self {
        Self {
            generated_at: Utc::now(),
            start_urls: start_urls.to_vec(),
            nodes: nodes
                .into_iter()
                .map(|node| (node.url.clone(), IndexedNode::from(node)))
                .collect(),
        }
    }

    /// Rebuilds the page nodes stored in this index
    pub fn page_nodes(&self) -> Vec<PageNode> {
        self.nodes
            .iter()
            .map(|(url, node)| PageNode {
                url: url.clone(),
                title: node.title.clone(),
                local_path: node.local_path.clone(),
                parent: node.parent.clone(),
                children: node.children.clone(),
            })
            .collect()
    }
}

/// Writes the index as pretty-printed JSON
///
/// The file is written to a temporary sibling first and renamed into place,
/// so readers never observe a partially written index.
pub async fn write_index(path: &Path, index: &CrawlIndex) -> Result<(), IndexError> {
    let json = serde_json::to_string_pretty(index).map_err(|source| IndexError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let tmp_path = temp_path_for(path);
    let io_err = |source| IndexError::Io {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;

    tracing::info!(
        "Index written to {} ({} nodes)",
        path.display(),
        index.nodes.len()
    );
    Ok(())
}

/// Reads an index file previously produced by [`write_index`]
pub fn read_index(path: &Path) -> Result<CrawlIndex, IndexError> {
    let content = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| IndexError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
