// File: ./src/model/entry.rs
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Catalog,
    Remote,
    Local,
}

/// One deadline occurrence, ready for ordering and filtering.
///
/// `instant` is `None` for deadlines that are not announced yet ("TBA").
/// When present it already carries the boundary correction.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub details: Option<String>,
    pub instant: Option<DateTime<FixedOffset>>,
    pub tags: Vec<String>,
    pub source: EntrySource,
}

impl Entry {
    /// `now - instant` in milliseconds; positive once the deadline passed.
    pub fn diff_millis(&self, now: DateTime<Utc>) -> Option<i64> {
        self.instant
            .map(|instant| now.timestamp_millis() - instant.timestamp_millis())
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.diff_millis(now).is_some_and(|diff| diff > 0)
    }
}

/// Lower-cases and collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, without leading or trailing dashes.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Id of the `index`-th deadline of a catalog record.
pub fn catalog_id(name: &str, year: i32, index: usize) -> String {
    slugify(&format!("{}{}-{}", name, year, index))
}

/// Id of the `index`-th record of a dynamic source.
pub fn dynamic_id(name: &str, datetime: &str, index: usize) -> String {
    slugify(&format!("{}-{}-{}", name, datetime, index))
}

/// Trims tags, splits whitespace separated lists and drops duplicates while
/// keeping first-seen order.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for item in raw {
        for tag in item.as_ref().split_whitespace() {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }
    tags
}
