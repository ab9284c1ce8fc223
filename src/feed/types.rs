//! Feed model types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::upstream::YuTorahQuery;

/// Duration written for every item; the upstream records carry none we trust.
pub const PLACEHOLDER_DURATION: &str = "00:29:00";

/// MIME type of every enclosure.
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Upstream API a feed is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// YUTorah search API.
    Yutorah,
    /// TorahAnytime lecture list API.
    Torahanytime,
}

/// Upstream source plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum FeedSource {
    /// YUTorah search.
    Yutorah(YuTorahQuery),
    /// All lectures of one TorahAnytime speaker.
    Torahanytime {
        /// TorahAnytime speaker id.
        speaker_id: u64,
    },
}

impl FeedSource {
    /// Which upstream schema this source returns.
    pub fn kind(&self) -> SourceKind {
        match self {
            FeedSource::Yutorah(_) => SourceKind::Yutorah,
            FeedSource::Torahanytime { .. } => SourceKind::Torahanytime,
        }
    }
}

/// One output podcast feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedDefinition {
    /// Output filename, e.g. `rav_asher_weiss.xml`.
    pub name: String,
    /// Upstream source and query.
    #[serde(flatten)]
    pub source: FeedSource,
    /// Channel artwork for this feed.
    #[serde(default)]
    pub artwork_url: Option<String>,
}

impl FeedDefinition {
    /// Create a feed definition.
    pub fn new(name: impl Into<String>, source: FeedSource) -> Self {
        Self {
            name: name.into(),
            source,
            artwork_url: None,
        }
    }

    /// Set the channel artwork.
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Human-readable name derived from the file name.
    pub fn display_name(&self) -> String {
        self.name.replace(".xml", "").replace('_', " ")
    }
}

/// A normalized feed episode.
///
/// Text fields hold unescaped values; escaping happens when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Upstream id, stable across runs.
    pub id: String,
    /// Episode title.
    pub title: String,
    /// Audio file URL.
    pub audio_url: String,
    /// Episode web page.
    pub page_url: Option<String>,
    /// Display duration.
    pub duration: String,
    /// Publication time.
    pub published_at: DateTime<Utc>,
    /// Enclosure length in bytes, 0 when unknown.
    pub file_size_bytes: u64,
}

impl Episode {
    /// Create an episode with placeholder duration and unknown size.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            audio_url: audio_url.into(),
            page_url: None,
            duration: PLACEHOLDER_DURATION.to_string(),
            published_at,
            file_size_bytes: 0,
        }
    }

    /// Set the page URL.
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    /// Link written to the item: the page URL, else the audio URL.
    pub fn link(&self) -> &str {
        self.page_url.as_deref().unwrap_or(&self.audio_url)
    }
}
