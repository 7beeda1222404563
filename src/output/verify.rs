//! Index verification
//!
//! Checks that every node recorded in an index still has its stored page
//! on disk. Missing pages can be written out as a seeds file so a follow-up
//! crawl fetches them again.

use crate::output::index::read_index;
use crate::IndexError;
use std::path::{Path, PathBuf};

/// File name used by [`write_missing_seeds`], placed in the output root
pub const MISSING_SEEDS_FILE: &str = "missing_seeds.txt";

/// Outcome of checking an index against the output root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Number of nodes in the index
    pub total: usize,

    /// Node URLs whose stored page is absent, in index order
    pub missing: Vec<String>,
}

impl VerificationReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Verifies the index stored at `root/index_file`
///
/// A node counts as missing when its `local_path` is empty or does not
/// exist under `root`.
///
/// # Arguments
///
/// * `root` - The crawl output root
/// * `index_file` - Index file name inside `root`
///
/// # Returns
///
/// * `Ok(VerificationReport)` - The index was read and checked
/// * `Err(IndexError)` - The index is missing or malformed
pub fn verify_index(root: &Path, index_file: &str) -> Result<VerificationReport, IndexError> {
    let index = read_index(&root.join(index_file))?;

    let missing = index
        .nodes
        .iter()
        .filter(|(_, node)| {
            node.local_path.is_empty() || !stored_path(root, &node.local_path).exists()
        })
        .map(|(url, _)| url.clone())
        .collect();

    Ok(VerificationReport {
        total: index.nodes.len(),
        missing,
    })
}

/// Writes the missing URLs, one per line, to `root/missing_seeds.txt`
///
/// # Returns
///
/// * `Ok(Some(path))` - The file was written
/// * `Ok(None)` - Nothing is missing; no file was written
pub fn write_missing_seeds(
    root: &Path,
    report: &VerificationReport,
) -> Result<Option<PathBuf>, IndexError> {
    if report.is_complete() {
        return Ok(None);
    }

    let path = root.join(MISSING_SEEDS_FILE);
    let mut content = report.missing.join("\n");
    content.push('\n');

    std::fs::write(&path, content).map_err(|source| IndexError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Wrote {} missing URL(s) to {}",
        report.missing.len(),
        path.display()
    );
    Ok(Some(path))
}

fn stored_path(root: &Path, local_path: &str) -> PathBuf {
    local_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}
