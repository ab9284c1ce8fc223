//! Configuration module for shiurfeed.

use serde::Deserialize;
use std::path::Path;

use crate::feed::{FeedDefinition, FeedSource};
use crate::upstream::YuTorahQuery;
use crate::{FeedError, Result};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/shiurfeed.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent sent to the upstream APIs.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Total timeout for JSON requests in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for the enclosure size HEAD request in seconds.
    #[serde(default = "default_head_timeout")]
    pub head_timeout_secs: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_head_timeout() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            head_timeout_secs: default_head_timeout(),
        }
    }
}

/// How a generation pass treats items already present in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Rewrite the file with only this pass's new items.
    #[default]
    Overwrite,
    /// Insert this pass's new items ahead of the existing ones.
    Prepend,
}

/// How previously published episodes are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Episode id occurs anywhere in the existing document text.
    #[default]
    Substring,
    /// Episode id equals one of the existing document's item guids.
    Guid,
}

/// Feed output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the feeds and headers file are written to.
    #[serde(default = "default_output_directory")]
    pub directory: String,
    /// Hosting site name, used to build channel links.
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Merge policy for existing feed files.
    #[serde(default)]
    pub merge_policy: MergePolicy,
    /// Duplicate detection mode.
    #[serde(default)]
    pub dedup: DedupMode,
    /// Channel artwork used when a feed has none of its own.
    #[serde(default)]
    pub artwork_url: Option<String>,
}

fn default_output_directory() -> String {
    "deploy_netlify".to_string()
}

fn default_site_name() -> String {
    "yutorah-rss".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            site_name: default_site_name(),
            merge_policy: MergePolicy::default(),
            dedup: DedupMode::default(),
            artwork_url: None,
        }
    }
}

/// Deployment collaborator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    /// Executable of the deployment CLI.
    #[serde(default = "default_deploy_command")]
    pub command: String,
    /// Auth token handed to the deployment CLI.
    #[serde(default)]
    pub auth_token: String,
    /// Site identifier to deploy to.
    #[serde(default)]
    pub site_id: String,
}

fn default_deploy_command() -> String {
    "netlify".to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            command: default_deploy_command(),
            auth_token: String::new(),
            site_id: String::new(),
        }
    }
}

/// Search service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// YUTorah organization searched.
    #[serde(default = "default_search_organization")]
    pub organization_id: u32,
    /// Upper bound on upstream pages fetched per request.
    #[serde(default = "default_search_max_pages")]
    pub max_pages: u32,
    /// Upper bound on results returned per request.
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
    /// Prefix for result photo filenames.
    #[serde(default = "default_photo_base_url")]
    pub photo_base_url: String,
}

fn default_search_organization() -> u32 {
    301
}

fn default_search_max_pages() -> u32 {
    10_000
}

fn default_search_max_results() -> usize {
    1000
}

fn default_photo_base_url() -> String {
    "https://www.yutorah.org/photos/".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            organization_id: default_search_organization(),
            max_pages: default_search_max_pages(),
            max_results: default_search_max_results(),
            photo_base_url: default_photo_base_url(),
        }
    }
}

/// Search HTTP surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    5000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
        }
    }
}

fn default_feeds() -> Vec<FeedDefinition> {
    vec![
        FeedDefinition::new(
            "reiss_daf_podcast.xml",
            FeedSource::Yutorah(YuTorahQuery::search(301, "R' Reiss Dayan's Daf")),
        ),
        FeedDefinition::new(
            "rav_asher_weiss.xml",
            FeedSource::Torahanytime { speaker_id: 860 },
        ),
        FeedDefinition::new(
            "shearim_b_tefillah.xml",
            FeedSource::Yutorah(YuTorahQuery::search(1863, "She'arim B'Tefillah")),
        ),
    ]
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Outbound HTTP configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Feed output configuration.
    #[serde(default)]
    pub output: OutputConfig,
    /// Deployment configuration.
    #[serde(default)]
    pub deploy: DeployConfig,
    /// Search service configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Search HTTP surface configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Feeds generated on each pass.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            deploy: DeployConfig::default(),
            search: SearchConfig::default(),
            web: WebConfig::default(),
            feeds: default_feeds(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NETLIFY_AUTH_TOKEN`: deployment auth token
    /// - `NETLIFY_SITE_ID`: deployment site identifier
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("NETLIFY_AUTH_TOKEN") {
            if !token.is_empty() {
                self.deploy.auth_token = token;
            }
        }
        if let Ok(site_id) = std::env::var("NETLIFY_SITE_ID") {
            if !site_id.is_empty() {
                self.deploy.site_id = site_id;
            }
        }
    }

    /// Check that everything a deploying run needs is present.
    ///
    /// Missing credentials abort the process before any feed is fetched.
    pub fn validate_for_deploy(&self) -> Result<()> {
        if self.deploy.auth_token.is_empty() || self.deploy.site_id.is_empty() {
            return Err(FeedError::Config(
                "missing NETLIFY_AUTH_TOKEN or NETLIFY_SITE_ID. \
                 Set them in config.toml or as environment variables."
                    .to_string(),
            ));
        }
        Ok(())
    }
}
