//! Upstream lecture APIs.
//!
//! Both fetchers return raw JSON records; mapping them onto feed episodes
//! happens in [`crate::feed::normalizer`].

pub mod client;
pub mod torahanytime;
pub mod yutorah;

/// One upstream record as returned by either API.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub use client::{HttpClient, HttpResponse, ReqwestClient};
pub use torahanytime::{TorahAnytimeClient, LECTURES_URL, LECTURE_LIMIT};
pub use yutorah::{PageOutcome, YuTorahClient, YuTorahQuery, SEARCH_URL};
