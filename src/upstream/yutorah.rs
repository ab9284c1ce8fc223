//! YUTorah search API fetcher.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::client::HttpClient;
use super::RawRecord;
use crate::error::{FeedError, Result};

/// YUTorah search endpoint.
pub const SEARCH_URL: &str = "https://www.yutorah.org/Search/GetSearchResults";

/// Sort order sent with every search, newest first.
pub const SORT_ORDER: &str = "shiurdate desc";

/// Query parameters for one YUTorah search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct YuTorahQuery {
    /// Organization filter.
    #[serde(default, alias = "organizationID")]
    pub organization_id: Option<u32>,
    /// Free-text search.
    #[serde(default)]
    pub search_query: Option<String>,
    /// Teacher filter, only sent together with `collection_id`.
    #[serde(default, alias = "teacherID")]
    pub teacher_id: Option<u32>,
    /// Collection filter, only sent together with `teacher_id`.
    #[serde(default, alias = "collectionID")]
    pub collection_id: Option<u32>,
}

impl YuTorahQuery {
    /// Free-text search within one organization.
    pub fn search(organization_id: u32, search_query: impl Into<String>) -> Self {
        Self {
            organization_id: Some(organization_id),
            search_query: Some(search_query.into()),
            ..Default::default()
        }
    }

    /// Restrict to a teacher's collection.
    pub fn with_collection(mut self, teacher_id: u32, collection_id: u32) -> Self {
        self.teacher_id = Some(teacher_id);
        self.collection_id = Some(collection_id);
        self
    }

    /// Build the request query string for the given page.
    pub fn params(&self, page: u32) -> Vec<(String, String)> {
        let mut params = vec![("sort_by".to_string(), SORT_ORDER.to_string())];

        if let Some(org) = self.organization_id {
            params.push(("organizationID".to_string(), org.to_string()));
        }
        if let Some(query) = &self.search_query {
            params.push(("search_query".to_string(), query.clone()));
        }
        if let (Some(teacher), Some(collection)) = (self.teacher_id, self.collection_id) {
            params.push(("teacherID".to_string(), teacher.to_string()));
            params.push(("collectionID".to_string(), collection.to_string()));
        }
        params.push(("page".to_string(), page.to_string()));

        params
    }
}

/// Result of fetching one search page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The `response.docs` array (possibly empty).
    Docs(Vec<RawRecord>),
    /// The body lacked the `response.docs` envelope.
    MissingEnvelope,
}

/// Extract `response.docs` from a search response body.
pub fn extract_docs(body: &Value) -> PageOutcome {
    match body
        .get("response")
        .and_then(|r| r.get("docs"))
        .and_then(Value::as_array)
    {
        Some(docs) => PageOutcome::Docs(
            docs.iter()
                .filter_map(|doc| doc.as_object().cloned())
                .collect(),
        ),
        None => PageOutcome::MissingEnvelope,
    }
}

/// YUTorah search client.
pub struct YuTorahClient {
    http: Arc<dyn HttpClient>,
    url: String,
}

impl YuTorahClient {
    /// Create a client against the public search endpoint.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            url: SEARCH_URL.to_string(),
        }
    }

    /// Fetch one page, surfacing transport, status and decode failures.
    pub async fn fetch_page(&self, query: &YuTorahQuery, page: u32) -> Result<PageOutcome> {
        let response = self.http.get(&self.url, &query.params(page)).await?;

        if !response.is_ok() {
            return Err(FeedError::Upstream {
                status: response.status,
            });
        }

        Ok(extract_docs(&response.json()?))
    }

    /// Fetch the first page of results for a feed.
    ///
    /// Every failure degrades to an empty list with a warning.
    pub async fn fetch_docs(&self, query: &YuTorahQuery) -> Vec<RawRecord> {
        match self.fetch_page(query, 1).await {
            Ok(PageOutcome::Docs(docs)) => docs,
            Ok(PageOutcome::MissingEnvelope) => {
                warn!("YUTorah response had no response.docs envelope");
                Vec::new()
            }
            Err(e) => {
                warn!("Error fetching YUTorah data: {}", e);
                Vec::new()
            }
        }
    }
}
