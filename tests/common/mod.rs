//! Test helpers for integration tests.
//!
//! Provides a scripted [`FakeHttpClient`] and record builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use shiurfeed::{FeedError, HttpClient, HttpResponse, Result};

type GetHandler = Box<dyn Fn(&str, &[(String, String)]) -> Result<HttpResponse> + Send + Sync>;
type HeadHandler = Box<dyn Fn(&str) -> Result<HttpResponse> + Send + Sync>;

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    /// "GET" or "HEAD".
    pub method: &'static str,
    /// Request URL.
    pub url: String,
    /// Query parameters (GET only).
    pub query: Vec<(String, String)>,
}

impl Call {
    /// Look up a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP client answering from closures and recording every request.
pub struct FakeHttpClient {
    get: GetHandler,
    head: HeadHandler,
    calls: Mutex<Vec<Call>>,
}

impl FakeHttpClient {
    /// Every GET returns an empty 200 body; every HEAD reports 1024 bytes.
    pub fn new() -> Self {
        Self {
            get: Box::new(|_, _| Ok(HttpResponse::ok("{}"))),
            head: Box::new(|_| Ok(HttpResponse::ok("").with_header("Content-Length", "1024"))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replace the GET handler.
    pub fn on_get<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &[(String, String)]) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        self.get = Box::new(handler);
        self
    }

    /// Replace the HEAD handler.
    pub fn on_head<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        self.head = Box::new(handler);
        self
    }

    /// Answer YUTorah GETs with one JSON body per page; later pages are empty.
    pub fn with_pages(self, pages: Vec<Value>) -> Self {
        self.on_get(move |_, query| {
            let page: usize = query
                .iter()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(1);
            let body = pages
                .get(page - 1)
                .cloned()
                .unwrap_or_else(|| docs(vec![]));
            Ok(HttpResponse::ok(body.to_string()))
        })
    }

    /// Wrap in an `Arc`.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Requests made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// GET requests made so far.
    pub fn get_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "GET")
            .collect()
    }

    /// HEAD requests made so far.
    pub fn head_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "HEAD")
            .collect()
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            method: "GET",
            url: url.to_string(),
            query: query.to_vec(),
        });
        (self.get)(url, query)
    }

    async fn head(&self, url: &str, _timeout: Duration) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            method: "HEAD",
            url: url.to_string(),
            query: Vec::new(),
        });
        (self.head)(url)
    }
}

/// A transport failure.
pub fn network_error() -> FeedError {
    FeedError::Http("connection refused".to_string())
}

/// A YUTorah response body.
pub fn docs(records: Vec<Value>) -> Value {
    json!({"response": {"docs": records}})
}

/// A TorahAnytime response body.
pub fn lectures(records: Vec<Value>) -> Value {
    json!([{"result": {"data": records}}])
}

/// A YUTorah record usable by the feed generator.
pub fn shiur(id: u64, title: &str) -> Value {
    json!({
        "shiurid": id,
        "shiurtitle": title,
        "shiurdownloadurl": format!("https://download.yutorah.org/2025/{}.mp3", id),
        "shiururl": format!("https://www.yutorah.org/lectures/{}", id),
        "shiurdateformatted": "March 3, 2025",
    })
}

/// A YUTorah record as seen by the search service.
pub fn search_doc(id: u64, title: &str, teacher: &str) -> Value {
    json!({
        "shiurid": id,
        "shiurtitle": title,
        "teacherfullname": [teacher],
        "categoryname": ["gemara"],
        "seriesname": ["Daf Yomi"],
        "durationformatted": "29 min",
        "shiurdownloadurl": format!("https://download.yutorah.org/{}.mp3", id),
        "shiurplayerurl": format!("https://www.yutorah.org/lectures/{}", id),
        "shiurdateformatted": "March 3, 2025",
        "shiurkeywords": [],
        "photo": ["teacher.jpg"],
    })
}

/// A TorahAnytime lecture record.
pub fn lecture(id: u64, title: &str, media: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "media": media,
        "speaker_name_first": "Asher",
        "speaker_name_last": "Weiss",
        "date_recorded": "2024-03-12",
    })
}
