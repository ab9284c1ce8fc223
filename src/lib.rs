//! shiurfeed - podcast feeds from shiur search APIs
//!
//! Polls the YUTorah and TorahAnytime lecture APIs, renders one podcast RSS
//! document per configured feed, publishes the output directory, and serves
//! a filtered search over the YUTorah catalogue.

pub mod config;
pub mod datetime;
pub mod deploy;
pub mod error;
pub mod feed;
pub mod logging;
pub mod search;
pub mod upstream;
pub mod web;

pub use config::Config;
pub use deploy::{Deployer, NetlifyDeployer};
pub use error::{FeedError, Result};
pub use feed::{Episode, FeedDefinition, FeedGenerator, FeedSource};
pub use search::{SearchParams, SearchResult, SearchService};
pub use upstream::{HttpClient, HttpResponse, ReqwestClient};
