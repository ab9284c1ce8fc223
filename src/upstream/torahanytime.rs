//! TorahAnytime lecture list fetcher.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use super::client::HttpClient;
use super::RawRecord;
use crate::error::{FeedError, Result};

/// RPC endpoint listing a speaker's lectures.
pub const LECTURES_URL: &str =
    "https://trpc.torahanytime.com/website.speakerPage.lectureList.getLectures";

/// Page size requested in the single call made per feed.
pub const LECTURE_LIMIT: u32 = 10_000;

/// Build the query string for a speaker's lecture list.
pub fn lecture_params(speaker_id: u64) -> Vec<(String, String)> {
    let input = json!({
        "0": {
            "speakerId": speaker_id,
            "limit": LECTURE_LIMIT,
            "offset": 0,
            "sortDirection": "DESC",
        }
    });

    vec![
        ("batch".to_string(), "1".to_string()),
        ("input".to_string(), input.to_string()),
    ]
}

/// Extract the first batch result's `result.data` array.
pub fn extract_lectures(body: &Value) -> Vec<RawRecord> {
    body.get(0)
        .and_then(|first| first.get("result"))
        .and_then(|result| result.get("data"))
        .and_then(Value::as_array)
        .map(|data| {
            data.iter()
                .filter_map(|lecture| lecture.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// TorahAnytime client.
pub struct TorahAnytimeClient {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl TorahAnytimeClient {
    /// Create a client against the public RPC endpoint.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            url: LECTURES_URL.to_string(),
        }
    }

    /// Fetch a speaker's lectures, newest first.
    pub async fn fetch_lectures(&self, speaker_id: u64) -> Result<Vec<RawRecord>> {
        let response = self.http.get(&self.url, &lecture_params(speaker_id)).await?;

        if !response.is_ok() {
            return Err(FeedError::Upstream {
                status: response.status,
            });
        }

        Ok(extract_lectures(&response.json()?))
    }

    /// Like [`fetch_lectures`](Self::fetch_lectures) but degrades every failure
    /// to an empty list with a warning.
    pub async fn fetch_docs(&self, speaker_id: u64) -> Vec<RawRecord> {
        self.fetch_lectures(speaker_id).await.unwrap_or_else(|e| {
            warn!("Error fetching TorahAnytime data: {}", e);
            Vec::new()
        })
    }
}
