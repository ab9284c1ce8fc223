//! Podcast feed generation.
//!
//! This module turns upstream lecture records into podcast RSS documents.

pub mod dedup;
pub mod generator;
pub mod normalizer;
pub mod renderer;
pub mod types;

pub use dedup::KnownEpisodes;
pub use generator::{CollectedEpisodes, FeedGenerator, GenerationReport};
pub use normalizer::{normalize, EpisodeMapper, Skip, TorahAnytimeMapper, YuTorahMapper};
pub use renderer::{escape_xml, render_feed, ChannelMetadata};
pub use types::{Episode, FeedDefinition, FeedSource, SourceKind, PLACEHOLDER_DURATION};
