//! Search job API
//!
//! A search runs as a server-side job: create it, poll its status until the
//! server has gathered all results, page through messages or records, then
//! delete the job to release its resources.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{ApiClient, with_query};
use crate::completion::ResultRow;
use crate::error::{RequestError, Result};

/// Largest page the messages and records endpoints accept
const MAX_PAGE_SIZE: u32 = 10_000;

const STATE_DONE: &str = "DONE GATHERING RESULTS";
const STATE_CANCELLED: &str = "CANCELLED";
const STATE_FORCE_PAUSED: &str = "FORCE PAUSED";

/// Body of a search job creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJobRequest {
    pub query: String,
    /// Start of the time range (ISO 8601 or epoch milliseconds)
    pub from: String,
    /// End of the time range (ISO 8601 or epoch milliseconds)
    pub to: String,
    pub time_zone: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub by_receipt_time: bool,
}

impl SearchJobRequest {
    pub fn new(query: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from: from.into(),
            to: to.into(),
            time_zone: "UTC".to_string(),
            by_receipt_time: false,
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }
}

/// Progress of a running search job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchJobStatus {
    pub state: String,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub record_count: u64,
    #[serde(default)]
    pub pending_errors: Vec<String>,
    #[serde(default)]
    pub pending_warnings: Vec<String>,
}

impl SearchJobStatus {
    /// Whether the job was cancelled before gathering all results
    pub fn is_cancelled(&self) -> bool {
        self.state == STATE_CANCELLED
    }

    /// Whether results can be fetched and no further polling is useful
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state.as_str(),
            STATE_DONE | STATE_CANCELLED | STATE_FORCE_PAUSED
        )
    }
}

/// Polling and paging knobs for [`ApiClient::run_search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub poll_interval: Duration,
    pub max_wait: Duration,
    /// Maximum number of rows to fetch
    pub limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(120),
            limit: 100,
        }
    }
}

/// Rows collected from a finished search job
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub job_id: String,
    pub status: SearchJobStatus,
    /// Records for aggregate queries, raw messages otherwise
    pub rows: Vec<ResultRow>,
}

impl SearchOutcome {
    /// Rows of a job that ran to completion
    ///
    /// A cancelled job only gathered part of its results, so it is reported
    /// as a request error instead.
    pub fn completed_rows(&self) -> Result<&[ResultRow]> {
        if self.status.is_cancelled() {
            return Err(RequestError {
                message: format!("Search job {} was cancelled", self.job_id),
                status_code: None,
            }
            .into());
        }
        Ok(&self.rows)
    }
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagesPage {
    #[serde(default)]
    messages: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    records: Vec<ResultRow>,
}

fn page_params(offset: u64, limit: u32) -> [(&'static str, String); 2] {
    [
        ("offset", offset.to_string()),
        ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
    ]
}

impl ApiClient {
    /// Start a search job and return its id
    pub async fn create_search_job(&self, request: &SearchJobRequest) -> Result<String> {
        let body = serde_json::to_value(request)?;
        let created: JobCreated = self
            .request("v1/search/jobs", Method::POST, Some(&body), &[])
            .await
            .parse()?;
        debug!("Created search job {}", created.id);
        Ok(created.id)
    }

    /// Current status of a search job
    pub async fn search_job_status(&self, job_id: &str) -> Result<SearchJobStatus> {
        self.get(&format!("v1/search/jobs/{job_id}")).await.parse()
    }

    /// One page of raw messages
    pub async fn search_job_messages(
        &self,
        job_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<ResultRow>> {
        let [offset, limit] = page_params(offset, limit);
        let path = with_query(
            &format!("v1/search/jobs/{job_id}/messages"),
            &[(offset.0, offset.1.as_str()), (limit.0, limit.1.as_str())],
        );
        let page: MessagesPage = self.get(&path).await.parse()?;
        Ok(page.messages)
    }

    /// One page of aggregate records
    pub async fn search_job_records(
        &self,
        job_id: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<ResultRow>> {
        let [offset, limit] = page_params(offset, limit);
        let path = with_query(
            &format!("v1/search/jobs/{job_id}/records"),
            &[(offset.0, offset.1.as_str()), (limit.0, limit.1.as_str())],
        );
        let page: RecordsPage = self.get(&path).await.parse()?;
        Ok(page.records)
    }

    /// Delete a search job
    pub async fn delete_search_job(&self, job_id: &str) -> Result<()> {
        self.request(&format!("v1/search/jobs/{job_id}"), Method::DELETE, None, &[])
            .await
            .into_result()?;
        Ok(())
    }

    /// Run a search job to completion and collect its rows
    ///
    /// Aggregate queries yield records; plain queries yield messages. The job
    /// is deleted afterwards, also when waiting for it timed out.
    pub async fn run_search(
        &self,
        request: &SearchJobRequest,
        options: SearchOptions,
    ) -> Result<SearchOutcome> {
        let job_id = self.create_search_job(request).await?;
        let started = Instant::now();

        let status = loop {
            let status = self.search_job_status(&job_id).await?;
            debug!(
                "Search job {} is {} ({} messages, {} records)",
                job_id, status.state, status.message_count, status.record_count
            );

            if status.is_finished() {
                break status;
            }

            if started.elapsed() >= options.max_wait {
                self.discard_job(&job_id).await;
                return Err(RequestError {
                    message: format!(
                        "Search job {job_id} did not finish within {}s",
                        options.max_wait.as_secs()
                    ),
                    status_code: None,
                }
                .into());
            }

            tokio::time::sleep(options.poll_interval).await;
        };

        for error in &status.pending_errors {
            warn!("Search job {}: {}", job_id, error);
        }

        let rows = if status.record_count > 0 {
            let limit = status.record_count.min(u64::from(options.limit)) as u32;
            self.search_job_records(&job_id, 0, limit).await
        } else if status.message_count > 0 {
            let limit = status.message_count.min(u64::from(options.limit)) as u32;
            self.search_job_messages(&job_id, 0, limit).await
        } else {
            Ok(Vec::new())
        };

        self.discard_job(&job_id).await;
        let rows = rows?;
        info!("Search job {} returned {} rows", job_id, rows.len());

        Ok(SearchOutcome {
            job_id,
            status,
            rows,
        })
    }

    async fn discard_job(&self, job_id: &str) {
        if let Err(e) = self.delete_search_job(job_id).await {
            warn!("Failed to delete search job {}: {}", job_id, e);
        }
    }
}
