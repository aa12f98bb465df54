//! HTTP client for the Sumo Logic REST API
//!
//! This module provides:
//! - Region table and endpoint resolution
//! - A Basic-auth request wrapper that reports failures as data
//! - Typed helpers for the field catalog, partitions and content folders
//! - Search job creation, polling and result paging

mod catalog;
mod content;
mod region;
mod response;
mod search;

#[cfg(test)]
pub(crate) mod test_server;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ResolvedConnection;
use crate::error::{ConfigError, Result};

pub use catalog::{CustomField, Partition};
pub use content::{ContentItem, Folder};
pub use region::{region_names, resolve_endpoint};
pub use reqwest::Method;
pub use response::ApiResponse;
pub use search::{SearchJobRequest, SearchJobStatus, SearchOptions, SearchOutcome};

/// API client bound to one deployment and one set of access keys
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    access_id: String,
    access_key: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `region_or_url` - Region name (`us2`, `eu`, ...) or explicit base URL
    /// * `access_id` - Access ID (Basic auth user)
    /// * `access_key` - Access key (Basic auth password)
    /// * `timeout` - Per-request timeout
    ///
    /// # Returns
    /// * `Result<Self>` - Client, or a configuration error for an unknown region
    pub fn new(
        region_or_url: &str,
        access_id: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = resolve_endpoint(region_or_url)?;

        // Search job requests must carry the session cookies set by the create call
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http client".to_string(),
                value: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            access_id: access_id.into(),
            access_key: access_key.into(),
        })
    }

    /// Create a client from merged connection settings
    pub fn from_connection(connection: &ResolvedConnection) -> Result<Self> {
        Self::new(
            &connection.endpoint,
            connection.access_id.clone(),
            connection.access_key.clone(),
            connection.timeout,
        )
    }

    /// API base URL, ending with `/`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path.trim_start_matches('/'))
    }

    /// Perform an authenticated API call
    ///
    /// Never fails: network errors, non-2xx statuses and malformed JSON all
    /// come back as [`ApiResponse::Failure`].
    ///
    /// # Arguments
    /// * `path` - Path relative to the API base, e.g. `v1/fields`
    /// * `method` - HTTP method
    /// * `body` - Optional JSON body
    /// * `headers` - Extra request headers
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> ApiResponse {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.access_id, Some(&self.access_key))
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request to {} failed: {}", url, e);
                return ApiResponse::failure(e.to_string(), e.status().map(|s| s.as_u16()));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return ApiResponse::failure(e.to_string(), Some(status.as_u16())),
        };

        if !status.is_success() {
            debug!("{} returned {}", url, status);
            return ApiResponse::failure(
                response::error_message(status, &text),
                Some(status.as_u16()),
            );
        }

        if text.trim().is_empty() {
            return ApiResponse::Success {
                data: Value::Null,
                status_code: status.as_u16(),
            };
        }

        match serde_json::from_str(&text) {
            Ok(data) => ApiResponse::Success {
                data,
                status_code: status.as_u16(),
            },
            Err(e) => ApiResponse::failure(
                format!("Invalid JSON response: {e}"),
                Some(status.as_u16()),
            ),
        }
    }

    /// Shorthand for a GET without body or extra headers
    pub async fn get(&self, path: &str) -> ApiResponse {
        self.request(path, Method::GET, None, &[]).await
    }
}

/// Append URL-encoded query parameters to a relative path
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let mut scratch = match reqwest::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return path.to_string(),
    };
    scratch.query_pairs_mut().extend_pairs(params.iter());

    match scratch.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}
