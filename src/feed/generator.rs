//! Feed generation pass.
//!
//! For every feed definition: read the previous output, fetch upstream
//! records, normalize, drop known episodes, look up enclosure sizes, render
//! and write. Feeds are processed one after another.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{HttpConfig, MergePolicy, OutputConfig};
use crate::deploy::prepare_output_dir;
use crate::error::Result;
use crate::feed::dedup::KnownEpisodes;
use crate::feed::normalizer::normalize;
use crate::feed::renderer::{render_feed, render_items, splice_items, ChannelMetadata};
use crate::feed::types::{Episode, FeedDefinition, FeedSource};
use crate::upstream::{HttpClient, RawRecord, TorahAnytimeClient, YuTorahClient};

/// Outcome of generating one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Feed file name.
    pub feed_name: String,
    /// Path written.
    pub path: PathBuf,
    /// Records returned by the upstream.
    pub fetched: usize,
    /// Episodes written in this pass.
    pub added: usize,
    /// Records dropped because they were already published.
    pub duplicates: usize,
    /// Records dropped because they lacked an id or audio URL.
    pub rejected: usize,
}

/// Episodes surviving one pass, with skip counts.
#[derive(Debug, Clone, Default)]
pub struct CollectedEpisodes {
    /// New episodes in upstream order.
    pub episodes: Vec<Episode>,
    /// Already-published records.
    pub duplicates: usize,
    /// Records without id or audio URL.
    pub rejected: usize,
}

/// Parse a `Content-Length` value; anything but plain digits is unknown.
pub fn parse_content_length(value: Option<&str>) -> u64 {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => {
            v.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Generates feed documents into the output directory.
pub struct FeedGenerator {
    http: Arc<dyn HttpClient>,
    yutorah: YuTorahClient,
    torahanytime: TorahAnytimeClient,
    output: OutputConfig,
    head_timeout: Duration,
}

impl FeedGenerator {
    /// Create a generator.
    pub fn new(http: Arc<dyn HttpClient>, output: &OutputConfig, http_config: &HttpConfig) -> Self {
        Self {
            yutorah: YuTorahClient::new(http.clone()),
            torahanytime: TorahAnytimeClient::new(http.clone()),
            http,
            output: output.clone(),
            head_timeout: Duration::from_secs(http_config.head_timeout_secs),
        }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        Path::new(&self.output.directory)
    }

    /// Generate every feed, in order.
    ///
    /// Upstream and per-episode failures only shrink a feed; I/O errors on
    /// the output directory abort the pass.
    pub async fn generate_all(&self, feeds: &[FeedDefinition]) -> Result<Vec<GenerationReport>> {
        prepare_output_dir(self.output_dir())?;

        let mut reports = Vec::with_capacity(feeds.len());
        for feed in feeds {
            reports.push(self.generate(feed).await?);
        }
        Ok(reports)
    }

    /// Generate a single feed file.
    pub async fn generate(&self, feed: &FeedDefinition) -> Result<GenerationReport> {
        info!(feed = %feed.name, "Fetching new episodes");

        let path = self.output_dir().join(&feed.name);
        let existing = read_existing(&path)?;
        let known = KnownEpisodes::from_document(existing.as_deref(), self.output.dedup);

        let records = self.fetch_records(&feed.source).await;
        let fetched = records.len();
        info!(feed = %feed.name, count = fetched, "Fetched upstream records");

        let collected = self
            .collect_episodes(&feed.source, &records, &known, Utc::now())
            .await;

        let channel = ChannelMetadata::for_feed(
            feed,
            &self.output.site_name,
            self.output.artwork_url.as_deref(),
        );
        let document = match (self.output.merge_policy, existing.as_deref()) {
            (MergePolicy::Prepend, Some(previous)) => {
                splice_items(previous, &render_items(&collected.episodes))
                    .unwrap_or_else(|| render_feed(&channel, &collected.episodes))
            }
            _ => render_feed(&channel, &collected.episodes),
        };

        std::fs::write(&path, document)?;

        info!(
            feed = %feed.name,
            added = collected.episodes.len(),
            duplicates = collected.duplicates,
            rejected = collected.rejected,
            "Feed updated"
        );

        Ok(GenerationReport {
            feed_name: feed.name.clone(),
            path,
            fetched,
            added: collected.episodes.len(),
            duplicates: collected.duplicates,
            rejected: collected.rejected,
        })
    }

    /// Fetch the raw records of a source; failures yield an empty list.
    pub async fn fetch_records(&self, source: &FeedSource) -> Vec<RawRecord> {
        match source {
            FeedSource::Yutorah(query) => self.yutorah.fetch_docs(query).await,
            FeedSource::Torahanytime { speaker_id } => {
                self.torahanytime.fetch_docs(*speaker_id).await
            }
        }
    }

    /// Normalize and filter records, looking up enclosure sizes for survivors.
    pub async fn collect_episodes(
        &self,
        source: &FeedSource,
        records: &[RawRecord],
        known: &KnownEpisodes,
        now: DateTime<Utc>,
    ) -> CollectedEpisodes {
        let mut collected = CollectedEpisodes::default();

        for record in records {
            let mut episode = match normalize(record, source.kind(), now) {
                Ok(episode) => episode,
                Err(skip) => {
                    warn!("Skipping record: {}", skip);
                    collected.rejected += 1;
                    continue;
                }
            };

            if known.contains(&episode.id) {
                debug!(id = %episode.id, "Skipping duplicate episode '{}'", episode.title);
                collected.duplicates += 1;
                continue;
            }

            episode.file_size_bytes = self.file_size(&episode.audio_url).await;
            collected.episodes.push(episode);
        }

        collected
    }

    /// Enclosure size from a HEAD request; 0 on any failure.
    pub async fn file_size(&self, url: &str) -> u64 {
        match self.http.head(url, self.head_timeout).await {
            Ok(response) => parse_content_length(response.header("content-length")),
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                0
            }
        }
    }
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
