// File: ./src/model/record.rs
// Raw records as they arrive from the catalog file and the dynamic stores.
use crate::error::MalformedTagError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A field that may be written either as a single string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            OneOrMany::One(s) => Some(s.as_str()),
            OneOrMany::Many(v) => v.first().map(String::as_str),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OneOrMany::One(_) => false,
            OneOrMany::Many(v) => v.is_empty(),
        }
    }
}

/// One recurring item of the static catalog (a conference edition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub deadline: OneOrMany,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, alias = "note")]
    pub details: Option<String>,
    #[serde(default, alias = "sub")]
    pub tags: OneOrMany,
}

/// A selectable tag and its human readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagType {
    pub tag: String,
    #[serde(default)]
    pub name: String,
}

/// The static catalog file: tag types plus catalog records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub types: Vec<TagType>,
    #[serde(default, alias = "conference")]
    pub conferences: Vec<CatalogRecord>,
}

impl Catalog {
    /// Reads a TOML catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read catalog file '{}': {}", path.display(), e)
        })?;
        Self::parse(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog file '{}': {}", path.display(), e))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Every selectable tag, in declaration order.
    pub fn all_tags(&self) -> Vec<String> {
        self.types.iter().map(|t| t.tag.clone()).collect()
    }
}

/// A user-contributed deadline from the remote store or the local fallback.
///
/// `tags` is kept as raw JSON: the server hands it out either as a list or
/// as a JSON-encoded string, and it is only decoded during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub tags: Value,
}

impl DeadlineRecord {
    pub fn new(name: &str, datetime: Option<&str>, tags: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            details: None,
            datetime: datetime.map(str::to_string),
            tags: Value::Array(tags.iter().map(|t| Value::String(t.to_string())).collect()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => "Untitled",
        }
    }

    /// Decodes the tags field. `null` and blank strings are an empty list.
    pub fn decode_tags(&self) -> Result<Vec<String>, MalformedTagError> {
        match &self.tags {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items.iter().map(tag_text).collect()),
            Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => Ok(items.iter().map(tag_text).collect()),
                Ok(Value::Null) => Ok(Vec::new()),
                Ok(other) => Err(MalformedTagError(format!("expected a list, got {}", other))),
                Err(e) => Err(MalformedTagError(e.to_string())),
            },
            other => Err(MalformedTagError(format!("unexpected value {}", other))),
        }
    }
}

fn tag_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Converts a JSON array into records, skipping the entries that are not
/// record-shaped instead of rejecting the whole list.
pub fn records_from_values(items: Vec<Value>, origin: &str) -> Vec<DeadlineRecord> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<DeadlineRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping malformed {} record #{}: {}", origin, index, e),
        }
    }
    records
}
