use crate::{UrlError, UrlResult};
use url::Url;

/// Canonicalizes a URL string for identity and visited-tracking
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Collapse runs of `/` in the path into a single separator
/// 5. Remove the fragment
///
/// The query string is left exactly as written: parameter order is part of
/// a URL's identity. Scheme and host casing, dot segments, and default ports
/// are handled by the `url` parser itself. The function is idempotent.
///
/// # Examples
///
/// ```
/// use sitegraph::url::canonicalize;
///
/// let url = canonicalize("http://127.0.0.1:8000//docs///a.html?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://127.0.0.1:8000/docs/a.html?b=2&a=1");
/// ```
pub fn canonicalize(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(&url)
}

/// Canonicalizes an already-parsed URL
///
/// See [`canonicalize`] for the rules applied.
pub fn canonicalize_url(url: &Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let mut canonical = url.clone();

    let collapsed = collapse_separators(canonical.path());
    if collapsed != canonical.path() {
        canonical.set_path(&collapsed);
    }

    canonical.set_fragment(None);

    Ok(canonical)
}

/// Collapses consecutive `/` characters into one
fn collapse_separators(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut previous_was_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_was_slash {
                continue;
            }
            previous_was_slash = true;
        } else {
            previous_was_slash = false;
        }
        result.push(c);
    }

    result
}
