//! Podcast RSS document rendering.

use crate::datetime::format_rfc822;
use crate::feed::types::{Episode, FeedDefinition, AUDIO_MIME_TYPE};

/// Channel language tag.
pub const FEED_LANGUAGE: &str = "en-us";

const RSS_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
"#;

const RSS_CLOSE: &str = "  </channel>\n</rss>\n";

const CATEGORY: &str = r#"    <itunes:category text="Religion &amp; Spirituality">
      <itunes:category text="Judaism"/>
    </itunes:category>
"#;

/// Escape the five XML special characters.
///
/// `&` is replaced first so the entities introduced afterwards are not
/// escaped again. Applying this twice double-escapes.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Channel-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMetadata {
    /// Channel title.
    pub title: String,
    /// Public URL of the feed.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Author and owner name.
    pub author: String,
    /// Channel artwork.
    pub artwork_url: Option<String>,
}

impl ChannelMetadata {
    /// Derive channel metadata from a feed definition.
    ///
    /// The feed's own artwork wins over `default_artwork`.
    pub fn for_feed(
        feed: &FeedDefinition,
        site_name: &str,
        default_artwork: Option<&str>,
    ) -> Self {
        let title = feed.display_name();
        Self {
            link: format!("https://{}.netlify.app/{}", site_name, feed.name),
            description: format!("Shiurim by {}", title),
            author: title.clone(),
            title,
            artwork_url: feed
                .artwork_url
                .clone()
                .or_else(|| default_artwork.map(str::to_string)),
        }
    }
}

/// Render a full feed document.
pub fn render_feed(channel: &ChannelMetadata, episodes: &[Episode]) -> String {
    let mut out = String::from(RSS_OPEN);

    out.push_str(&format!("    <title>{}</title>\n", escape_xml(&channel.title)));
    out.push_str(&format!("    <link>{}</link>\n", escape_xml(&channel.link)));
    out.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&channel.description)
    ));
    out.push_str(&format!("    <language>{}</language>\n", FEED_LANGUAGE));

    let author = escape_xml(&channel.author);
    out.push_str(&format!("    <itunes:author>{}</itunes:author>\n", author));
    out.push_str("    <itunes:owner>\n");
    out.push_str(&format!("      <itunes:name>{}</itunes:name>\n", author));
    out.push_str("    </itunes:owner>\n");
    out.push_str("    <itunes:explicit>no</itunes:explicit>\n");
    out.push_str(CATEGORY);
    if let Some(artwork) = &channel.artwork_url {
        out.push_str(&format!(
            "    <itunes:image href=\"{}\"/>\n",
            escape_xml(artwork)
        ));
    }

    out.push_str(&render_items(episodes));
    out.push_str(RSS_CLOSE);
    out
}

/// Render the `<item>` blocks for `episodes`, in order.
pub fn render_items(episodes: &[Episode]) -> String {
    episodes.iter().map(render_item).collect()
}

fn render_item(episode: &Episode) -> String {
    format!(
        r#"    <item>
      <title>{title}</title>
      <guid isPermaLink="false">{guid}</guid>
      <link>{link}</link>
      <enclosure url="{url}" length="{length}" type="{mime}"/>
      <itunes:duration>{duration}</itunes:duration>
      <pubDate>{date}</pubDate>
    </item>
"#,
        title = escape_xml(&episode.title),
        guid = escape_xml(&episode.id),
        link = escape_xml(episode.link()),
        url = escape_xml(&episode.audio_url),
        length = episode.file_size_bytes,
        mime = AUDIO_MIME_TYPE,
        duration = escape_xml(&episode.duration),
        date = format_rfc822(&episode.published_at),
    )
}

/// Insert rendered items into an existing document, ahead of its current items.
///
/// Returns `None` when the document has no `</channel>` to anchor on.
pub fn splice_items(existing: &str, items: &str) -> Option<String> {
    let anchor = match existing.find("<item>") {
        Some(pos) => line_start(existing, pos),
        None => line_start(existing, existing.find("</channel>")?),
    };

    let mut out = String::with_capacity(existing.len() + items.len());
    out.push_str(&existing[..anchor]);
    out.push_str(items);
    out.push_str(&existing[anchor..]);
    Some(out)
}

/// Back up over the indentation preceding `pos`.
fn line_start(text: &str, pos: usize) -> usize {
    let before = &text[..pos];
    let trimmed = before.trim_end_matches([' ', '\t']);
    if trimmed.is_empty() || trimmed.ends_with('\n') {
        trimmed.len()
    } else {
        pos
    }
}
