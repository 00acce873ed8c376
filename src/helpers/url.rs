//! URL helpers.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

// Escape everything but unreserved characters so common tag names keep
// readable URLs.
const SEGMENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Joins a site-relative path onto the configured path prefix.
///
/// With the default prefix `/`, `url_for(&config, "blog/")` is
/// `/blog/`; with prefix `/folio/` it is `/folio/blog/`.
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.path_prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Absolute URL including the configured domain, for feeds and
/// canonical links.
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Percent-encodes one path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ESCAPE).to_string()
}

/// Link to a tag's listing page. The tag name is used exactly as
/// written, so `/tags/Gaming` and `/tags/gaming` are different pages.
pub fn tag_url(config: &SiteConfig, tag: &str) -> String {
    url_for(config, &format!("tags/{}/", encode_segment(tag)))
}
