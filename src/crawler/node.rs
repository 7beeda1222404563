use serde::{Deserialize, Serialize};
use url::Url;

/// One successfully fetched page in the crawl graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    /// Canonical URL; unique key of the node
    pub url: String,

    /// Document title, if the page has one
    pub title: Option<String>,

    /// Storage path relative to the output root, `/`-separated
    pub local_path: String,

    /// Canonical URL of the page that first discovered this one
    pub parent: Option<String>,

    /// Canonical links found on the page, first-seen order, no repeats
    pub children: Vec<String>,
}

/// Removes repeated links while keeping the order of first appearance
pub fn dedup_links(links: impl IntoIterator<Item = Url>) -> Vec<Url> {
    let mut seen = std::collections::HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_links_keeps_first_seen_order() {
        let links = ["/b", "/a", "/b", "/c", "/a"]
            .iter()
            .map(|p| Url::parse(&format!("http://127.0.0.1:8000{}", p)).unwrap());

        let deduped: Vec<String> = dedup_links(links)
            .into_iter()
            .map(|u| u.path().to_string())
            .collect();

        assert_eq!(deduped, vec!["/b", "/a", "/c"]);
    }
}
