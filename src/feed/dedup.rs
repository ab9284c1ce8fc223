//! Recognition of episodes already present in a previously written feed.

use std::collections::HashSet;

use tracing::warn;

use crate::config::DedupMode;

/// What a previously written feed is known to contain.
#[derive(Debug, Clone)]
pub enum KnownEpisodes {
    /// Raw document text, searched for the id as a substring.
    ///
    /// Coarse: an id that happens to occur anywhere in the document, for
    /// example inside a longer id, counts as present.
    Corpus(String),
    /// Item guids parsed out of the document.
    Guids(HashSet<String>),
}

impl KnownEpisodes {
    /// Build from an existing document, absent on the first run.
    pub fn from_document(existing: Option<&str>, mode: DedupMode) -> Self {
        let text = existing.unwrap_or("");
        match mode {
            DedupMode::Substring => KnownEpisodes::Corpus(text.to_string()),
            DedupMode::Guid => KnownEpisodes::Guids(parse_guids(text)),
        }
    }

    /// Whether an episode with this id was already published.
    pub fn contains(&self, id: &str) -> bool {
        match self {
            KnownEpisodes::Corpus(text) => !id.is_empty() && text.contains(id),
            KnownEpisodes::Guids(guids) => guids.contains(id),
        }
    }
}

/// Collect the item guids of a feed document.
///
/// Empty or unparsable documents yield an empty set.
fn parse_guids(text: &str) -> HashSet<String> {
    if text.trim().is_empty() {
        return HashSet::new();
    }

    match feed_rs::parser::parse(text.as_bytes()) {
        Ok(feed) => feed.entries.into_iter().map(|entry| entry.id).collect(),
        Err(e) => {
            warn!("Existing feed could not be parsed, treating as empty: {}", e);
            HashSet::new()
        }
    }
}
