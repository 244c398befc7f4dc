use crate::utils::collapse_whitespace;
use sha2::{Digest, Sha256};
use url::Url;

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || key == "fbclid" || key == "gclid"
}

/// Canonical form of an article link, used as the primary dedup key.
///
/// Drops the fragment and tracking query parameters. Input that does not parse
/// as a URL is returned trimmed.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.to_string()
}

/// SHA-256 over the normalized title and body, hex encoded.
///
/// A blank body carries no content to compare, so the url is hashed in its
/// place and only the url decides whether such an article is new.
pub fn content_hash(url: &str, title: &str, body: &str) -> String {
    let body = collapse_whitespace(body).to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(collapse_whitespace(title).to_lowercase().as_bytes());
    hasher.update(b"\n");
    if body.is_empty() {
        hasher.update(b"url:");
        hasher.update(url.as_bytes());
    } else {
        hasher.update(body.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
