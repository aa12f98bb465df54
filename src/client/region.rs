//! Deployment region lookup
//!
//! Every account lives in exactly one deployment, and each deployment has
//! its own API host. `us1` is the legacy deployment without a region label
//! in its host name.

use crate::error::{ConfigError, Result};

/// Known deployments and their API base URLs
const REGIONS: &[(&str, &str)] = &[
    ("us1", "https://api.sumologic.com/api/"),
    ("us2", "https://api.us2.sumologic.com/api/"),
    ("eu", "https://api.eu.sumologic.com/api/"),
    ("au", "https://api.au.sumologic.com/api/"),
    ("de", "https://api.de.sumologic.com/api/"),
    ("jp", "https://api.jp.sumologic.com/api/"),
    ("ca", "https://api.ca.sumologic.com/api/"),
    ("in", "https://api.in.sumologic.com/api/"),
    ("fed", "https://api.fed.sumologic.com/api/"),
    ("kr", "https://api.kr.sumologic.com/api/"),
    ("ch", "https://api.ch.sumologic.com/api/"),
];

/// Names of all known regions, in table order
pub fn region_names() -> Vec<&'static str> {
    REGIONS.iter().map(|(name, _)| *name).collect()
}

/// Resolve a region name or explicit endpoint URL to an API base URL
///
/// Region names are matched case-insensitively. Anything starting with
/// `http://` or `https://` is taken as a custom endpoint; the result always
/// ends with a single `/` so relative paths can be appended directly.
pub fn resolve_endpoint(region_or_url: &str) -> Result<String> {
    let candidate = region_or_url.trim();

    if candidate.starts_with("https://") || candidate.starts_with("http://") {
        let host = candidate.split("://").nth(1).unwrap_or("");
        if host.trim_matches('/').is_empty() {
            return Err(ConfigError::UnknownRegion(region_or_url.to_string()).into());
        }
        return Ok(format!("{}/", candidate.trim_end_matches('/')));
    }

    let lowered = candidate.to_ascii_lowercase();
    REGIONS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, url)| url.to_string())
        .ok_or_else(|| ConfigError::UnknownRegion(region_or_url.to_string()).into())
}
