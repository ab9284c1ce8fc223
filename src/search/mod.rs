//! Shiur search.

pub mod service;
pub mod types;

pub use service::SearchService;
pub use types::{join_field, title_case, SearchParams, SearchQuery, SearchResult};
