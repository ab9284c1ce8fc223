//! Mapping of upstream records onto [`Episode`]s.
//!
//! Each upstream schema has its own [`EpisodeMapper`]; callers pick one by
//! [`SourceKind`] and treat a [`Skip`] as "log and move on".

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

use crate::datetime::publication_date;
use crate::feed::types::{Episode, SourceKind};
use crate::upstream::RawRecord;

/// Title used when a record has none.
pub const UNTITLED_EPISODE: &str = "Untitled Episode";

/// TorahAnytime audio host.
pub const TORAHANYTIME_AUDIO_BASE: &str = "https://dl.torahanytime.com/mp3";

/// Why a record did not become an episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Neither id field was present.
    MissingId,
    /// No usable audio URL.
    MissingAudioUrl,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingId => write!(f, "no episode id"),
            Skip::MissingAudioUrl => write!(f, "no audio URL"),
        }
    }
}

/// Produces zero or one episode from a raw upstream record.
pub trait EpisodeMapper: Send + Sync {
    /// Map one record. `now` is used when the record's date does not parse.
    fn map_record(&self, record: &RawRecord, now: DateTime<Utc>) -> Result<Episode, Skip>;
}

/// Mapper for YUTorah search documents.
pub struct YuTorahMapper;

/// Mapper for TorahAnytime lectures.
pub struct TorahAnytimeMapper;

impl SourceKind {
    /// The mapper for this source's schema.
    pub fn mapper(self) -> &'static dyn EpisodeMapper {
        match self {
            SourceKind::Yutorah => &YuTorahMapper,
            SourceKind::Torahanytime => &TorahAnytimeMapper,
        }
    }
}

/// Normalize one record from the given source.
pub fn normalize(
    record: &RawRecord,
    kind: SourceKind,
    now: DateTime<Utc>,
) -> Result<Episode, Skip> {
    kind.mapper().map_record(record, now)
}

/// Render a scalar JSON value as text. Null, arrays and objects yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First non-empty text value among `keys`.
fn first_text(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .filter_map(scalar_text)
        .find(|s| !s.trim().is_empty())
}

/// Episode id: `shiurid`, else `id`, coerced to a string.
pub fn record_id(record: &RawRecord) -> String {
    first_text(record, &["shiurid", "id"]).unwrap_or_default()
}

/// Episode title: `shiurtitle`, else `title`, else a placeholder.
pub fn record_title(record: &RawRecord) -> String {
    first_text(record, &["shiurtitle", "title"]).unwrap_or_else(|| UNTITLED_EPISODE.to_string())
}

fn require_id(record: &RawRecord) -> Result<String, Skip> {
    let id = record_id(record);
    if id.is_empty() {
        return Err(Skip::MissingId);
    }
    Ok(id)
}

impl EpisodeMapper for YuTorahMapper {
    fn map_record(&self, record: &RawRecord, now: DateTime<Utc>) -> Result<Episode, Skip> {
        let id = require_id(record)?;
        let audio_url = first_text(record, &["shiurdownloadurl"]).ok_or(Skip::MissingAudioUrl)?;
        let raw_date = first_text(record, &["shiurdateformatted"]);
        let page_url = first_text(record, &["shiururl"]).unwrap_or_else(|| audio_url.clone());

        Ok(Episode::new(
            id,
            record_title(record),
            audio_url,
            publication_date(raw_date.as_deref(), now),
        )
        .with_page_url(page_url))
    }
}

/// Lowercase a speaker name and hyphenate its spaces.
fn slug_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Build the TorahAnytime download URL for a lecture.
///
/// The `title` parameter names the downloaded file
/// `1-{first}-{last}_{date}.mp3`, with the date's hyphens turned into
/// underscores.
pub fn torahanytime_audio_url(
    media_id: &str,
    speaker_first: &str,
    speaker_last: &str,
    date_recorded: &str,
) -> String {
    let filename = format!(
        "1-{}-{}_{}.mp3",
        slug_name(speaker_first),
        slug_name(speaker_last),
        date_recorded.trim().replace('-', "_")
    );
    format!(
        "{}/{}.mp3?title={}",
        TORAHANYTIME_AUDIO_BASE,
        media_id,
        urlencoding::encode(&filename)
    )
}

impl EpisodeMapper for TorahAnytimeMapper {
    fn map_record(&self, record: &RawRecord, now: DateTime<Utc>) -> Result<Episode, Skip> {
        let id = require_id(record)?;
        let media_id = first_text(record, &["media"]).ok_or(Skip::MissingAudioUrl)?;
        let first = first_text(record, &["speaker_name_first", "speaker_first_name"])
            .unwrap_or_default();
        let last =
            first_text(record, &["speaker_name_last", "speaker_last_name"]).unwrap_or_default();
        let raw_date = first_text(record, &["date_recorded"]);

        let audio_url =
            torahanytime_audio_url(&media_id, &first, &last, raw_date.as_deref().unwrap_or(""));

        Ok(Episode::new(
            id,
            record_title(record),
            audio_url,
            publication_date(raw_date.as_deref(), now),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_yutorah_record() {
        let rec = record(json!({
            "shiurid": 1123456,
            "shiurtitle": "Bava Kamma 12",
            "shiurdownloadurl": "https://download.yutorah.org/2025/1/1123456.mp3",
            "shiurdateformatted": "March 3, 2025",
        }));

        let episode = normalize(&rec, SourceKind::Yutorah, now()).unwrap();
        assert_eq!(episode.id, "1123456");
        assert_eq!(episode.title, "Bava Kamma 12");
        assert_eq!(
            episode.audio_url,
            "https://download.yutorah.org/2025/1/1123456.mp3"
        );
        assert_eq!(episode.link(), episode.audio_url);
        assert_eq!(
            episode.published_at,
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap()
        );
        assert_eq!(episode.file_size_bytes, 0);
    }

    #[test]
    fn test_yutorah_page_url() {
        let rec = record(json!({
            "shiurid": "9",
            "shiurdownloadurl": "https://d/9.mp3",
            "shiururl": "https://www.yutorah.org/lectures/9/",
        }));
        let episode = normalize(&rec, SourceKind::Yutorah, now()).unwrap();
        assert_eq!(episode.link(), "https://www.yutorah.org/lectures/9/");
    }

    #[test]
    fn test_missing_audio_url_is_skipped() {
        let rec = record(json!({"shiurid": 1, "shiurtitle": "No audio"}));
        assert_eq!(
            normalize(&rec, SourceKind::Yutorah, now()),
            Err(Skip::MissingAudioUrl)
        );

        let rec = record(json!({"shiurid": 1, "shiurdownloadurl": ""}));
        assert_eq!(
            normalize(&rec, SourceKind::Yutorah, now()),
            Err(Skip::MissingAudioUrl)
        );

        let rec = record(json!({"id": 1, "title": "No media"}));
        assert_eq!(
            normalize(&rec, SourceKind::Torahanytime, now()),
            Err(Skip::MissingAudioUrl)
        );
    }

    #[test]
    fn test_missing_id_is_skipped() {
        let rec = record(json!({"shiurdownloadurl": "https://d/x.mp3"}));
        assert_eq!(
            normalize(&rec, SourceKind::Yutorah, now()),
            Err(Skip::MissingId)
        );
    }

    #[test]
    fn test_id_and_title_fallbacks() {
        let rec = record(json!({"id": 77, "title": "Fallback", "shiurdownloadurl": "u"}));
        let episode = normalize(&rec, SourceKind::Yutorah, now()).unwrap();
        assert_eq!(episode.id, "77");
        assert_eq!(episode.title, "Fallback");

        let rec = record(json!({"shiurid": null, "id": "abc", "shiurdownloadurl": "u"}));
        let episode = normalize(&rec, SourceKind::Yutorah, now()).unwrap();
        assert_eq!(episode.id, "abc");
        assert_eq!(episode.title, UNTITLED_EPISODE);
    }

    #[test]
    fn test_unparsable_date_uses_now() {
        let rec = record(json!({
            "shiurid": 1,
            "shiurdownloadurl": "u",
            "shiurdateformatted": "sometime last week",
        }));
        let episode = normalize(&rec, SourceKind::Yutorah, now()).unwrap();
        assert_eq!(episode.published_at, now());
    }

    #[test]
    fn test_torahanytime_record() {
        let rec = record(json!({
            "id": 312345,
            "title": "Hilchos Shabbos",
            "media": 98765,
            "speaker_name_first": "Asher",
            "speaker_name_last": "Weiss",
            "date_recorded": "2024-03-12",
        }));

        let episode = normalize(&rec, SourceKind::Torahanytime, now()).unwrap();
        assert_eq!(episode.id, "312345");
        assert_eq!(
            episode.audio_url,
            "https://dl.torahanytime.com/mp3/98765.mp3?title=1-asher-weiss_2024_03_12.mp3"
        );
        assert_eq!(episode.page_url, None);
        assert_eq!(
            episode.published_at,
            Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_torahanytime_audio_url_encodes_title() {
        let url = torahanytime_audio_url("5", "Rav Asher", "Weiss", "2024-03-12");
        assert_eq!(
            url,
            "https://dl.torahanytime.com/mp3/5.mp3?title=1-rav-asher-weiss_2024_03_12.mp3"
        );

        let url = torahanytime_audio_url("5", "Yosef", "O'Neil", "2024-03-12");
        assert!(url.ends_with("title=1-yosef-o%27neil_2024_03_12.mp3"));
    }

    #[test]
    fn test_skip_display() {
        assert_eq!(Skip::MissingAudioUrl.to_string(), "no audio URL");
        assert_eq!(Skip::MissingId.to_string(), "no episode id");
    }
}
