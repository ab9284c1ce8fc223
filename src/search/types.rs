//! Search request and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FeedError, Result};
use crate::upstream::RawRecord;

/// Raw query-string parameters of a search request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Title substring.
    #[serde(default)]
    pub q: String,
    /// Teacher name substring.
    #[serde(default)]
    pub teacher: String,
    /// Category, accepted but not used for filtering.
    #[serde(default)]
    pub category: String,
}

impl SearchParams {
    /// Case-fold the parameters and require at least one filter.
    pub fn into_query(self) -> Result<SearchQuery> {
        let fold = |s: String| {
            let folded = s.trim().to_lowercase();
            (!folded.is_empty()).then_some(folded)
        };

        let query = SearchQuery {
            title: fold(self.q),
            teacher: fold(self.teacher),
            category: fold(self.category),
        };

        if query.title.is_none() && query.teacher.is_none() {
            return Err(FeedError::Validation(
                "At least one of 'q' (title) or 'teacher' is required".to_string(),
            ));
        }
        Ok(query)
    }
}

/// A validated, case-folded search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Title substring.
    pub title: Option<String>,
    /// Teacher name substring.
    pub teacher: Option<String>,
    /// Category, carried along but unused.
    pub category: Option<String>,
}

impl SearchQuery {
    /// Teacher filter first, then title filter.
    pub fn matches(&self, record: &RawRecord) -> bool {
        if let Some(teacher) = &self.teacher {
            if !join_field(record.get("teacherfullname")).to_lowercase().contains(teacher) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            let shiur_title = record
                .get("shiurtitle")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_lowercase();
            if !shiur_title.contains(title) {
                return false;
            }
        }
        true
    }
}

/// Join a list field with `", "`; stringify scalars; empty for null or absent.
pub fn join_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(false)) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Display projection of a matching shiur.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Shiur id as returned upstream.
    pub id: Value,
    /// Shiur title.
    pub title: Option<String>,
    /// Title-cased teacher names.
    pub teacher: String,
    /// Title-cased category names.
    pub categories: String,
    /// Joined series names.
    pub series: String,
    /// Formatted duration.
    pub duration: String,
    /// Audio download URL.
    pub download_url: Option<String>,
    /// Web player URL.
    pub player_url: Option<String>,
    /// Formatted date.
    pub date: Option<String>,
    /// Keywords as returned upstream.
    pub keywords: Value,
    /// Photo URL, when the shiur has one.
    pub image: Option<String>,
}

fn text_field(record: &RawRecord, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn photo_name(record: &RawRecord) -> Option<String> {
    match record.get("photo")? {
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl SearchResult {
    /// Project a YUTorah record.
    pub fn from_record(record: &RawRecord, photo_base_url: &str) -> Self {
        Self {
            id: record.get("shiurid").cloned().unwrap_or(Value::Null),
            title: text_field(record, "shiurtitle"),
            teacher: title_case(&join_field(record.get("teacherfullname")).to_lowercase()),
            categories: title_case(&join_field(record.get("categoryname")).to_lowercase()),
            series: join_field(record.get("seriesname")),
            duration: text_field(record, "durationformatted").unwrap_or_default(),
            download_url: text_field(record, "shiurdownloadurl"),
            player_url: text_field(record, "shiurplayerurl"),
            date: text_field(record, "shiurdateformatted"),
            keywords: record.get("shiurkeywords").cloned().unwrap_or(Value::Null),
            image: photo_name(record).map(|name| format!("{}{}", photo_base_url, name)),
        }
    }
}
