//! Paginated, filtered search over the YUTorah API.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::types::{SearchParams, SearchQuery, SearchResult};
use crate::upstream::{HttpClient, PageOutcome, YuTorahClient, YuTorahQuery};

/// Search service.
pub struct SearchService {
    client: YuTorahClient,
    config: SearchConfig,
}

impl SearchService {
    /// Create a search service.
    pub fn new(http: Arc<dyn HttpClient>, config: SearchConfig) -> Self {
        Self {
            client: YuTorahClient::new(http),
            config,
        }
    }

    /// Validate raw parameters and run the search.
    pub async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>> {
        let query = params.into_query()?;
        self.run(&query).await
    }

    /// Page through the upstream until a stop condition, collecting matches.
    ///
    /// Stops on an empty page, a missing `response.docs` envelope, once
    /// `max_results` matches are collected, or after `max_pages` pages.
    /// Upstream failures abort the whole search.
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let upstream_query = YuTorahQuery::search(
            self.config.organization_id,
            query.title.clone().unwrap_or_default(),
        );

        let mut results = Vec::new();
        let mut page = 1;

        while page <= self.config.max_pages {
            let docs = match self.client.fetch_page(&upstream_query, page).await? {
                PageOutcome::Docs(docs) if !docs.is_empty() => docs,
                PageOutcome::Docs(_) => {
                    debug!(page, "Empty page, stopping");
                    break;
                }
                PageOutcome::MissingEnvelope => {
                    debug!(page, "Response without docs envelope, stopping");
                    break;
                }
            };

            results.extend(
                docs.iter()
                    .filter(|record| query.matches(record))
                    .map(|record| SearchResult::from_record(record, &self.config.photo_base_url)),
            );

            if results.len() >= self.config.max_results {
                break;
            }
            page += 1;
        }

        results.truncate(self.config.max_results);
        info!(
            title = ?query.title,
            teacher = ?query.teacher,
            results = results.len(),
            "Search complete"
        );
        Ok(results)
    }
}
