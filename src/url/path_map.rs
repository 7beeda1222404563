//! Deterministic URL to filesystem path mapping
//!
//! Pages are stored under the output root mirroring the URL path. Query
//! strings are folded into the file name in a normalized, hashed form so
//! that parameter order never produces a second copy of a page while
//! different parameter values never overwrite each other.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::form_urlencoded;
use url::Url;

/// Number of hex characters kept from the query hash
const QUERY_HASH_LEN: usize = 8;

/// Longest normalized query spliced verbatim into a file name
///
/// Longer queries are cut here; the hash covers the full query, so
/// truncation never merges two distinct queries.
const MAX_QUERY_IN_NAME: usize = 120;

const DEFAULT_FILENAME: &str = "index.html";

/// Where a page is stored, relative to the crawl output root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPath {
    /// Forward-slash separated path including the file name
    pub relative_path: String,

    /// The file name alone
    pub filename: String,
}

impl LocalPath {
    /// Resolves the relative path under `root` using platform separators
    pub fn to_path_buf(&self, root: &Path) -> PathBuf {
        self.relative_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

/// Maps a canonical URL to its storage location
///
/// # Rules
///
/// - The URL path becomes the directory structure
/// - A path that is empty or ends in `/` stores as `index.html`
/// - Extensions other than `.html`/`.htm` (or none) become `.html`
/// - A non-empty query adds `__<normalized query>__<hash>` before the
///   extension
///
/// The mapping depends on nothing but the URL.
///
/// # Examples
///
/// ```
/// use sitegraph::url::local_path_for;
/// use url::Url;
///
/// let url = Url::parse("http://127.0.0.1:8000/docs/guide/").unwrap();
/// assert_eq!(local_path_for(&url).relative_path, "docs/guide/index.html");
/// ```
pub fn local_path_for(url: &Url) -> LocalPath {
    let mut path = url.path().to_string();
    if path.is_empty() || path.ends_with('/') {
        path.push_str(DEFAULT_FILENAME);
    }

    let path = path.trim_start_matches('/');
    let (dir, base_name) = match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };

    let (stem, extension) = split_extension(base_name);
    let extension = if is_html_extension(extension) {
        extension
    } else {
        ".html"
    };

    let filename = match url.query().filter(|q| !q.is_empty()) {
        Some(query) => {
            let normalized = normalize_query(query);
            let hash = query_hash(&normalized);
            format!(
                "{}__{}__{}{}",
                stem,
                truncate_on_char_boundary(&normalized, MAX_QUERY_IN_NAME),
                hash,
                extension
            )
        }
        None => format!("{}{}", stem, extension),
    };

    let relative_path = if dir.is_empty() {
        filename.clone()
    } else {
        format!("{}/{}", dir, filename)
    };

    LocalPath {
        relative_path,
        filename,
    }
}

/// Normalizes a query string for storage naming
///
/// Pairs are decoded (blank values kept), sorted by key then value, and
/// re-encoded as `application/x-www-form-urlencoded`.
pub fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Returns the short hex hash used to disambiguate query variants
pub fn query_hash(normalized_query: &str) -> String {
    let digest = Sha256::digest(normalized_query.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(QUERY_HASH_LEN);
    encoded
}

/// Splits `name.ext` into (`name`, `.ext`); a leading dot is not an extension
fn split_extension(base_name: &str) -> (&str, &str) {
    match base_name.rfind('.') {
        Some(idx) if idx > 0 => (&base_name[..idx], &base_name[idx..]),
        _ => (base_name, ""),
    }
}

fn is_html_extension(extension: &str) -> bool {
    extension.eq_ignore_ascii_case(".html") || extension.eq_ignore_ascii_case(".htm")
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
