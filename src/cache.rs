// File: ./src/cache.rs
// Local deadline list: user-added records kept in the key-value store.
//
// This is the fallback the board reads when the remote store cannot be
// reached. Records are stored as a bare JSON array under
// `<namespace>:custom_deadlines`, the same shape the remote store returns.
use crate::error::StorageError;
use crate::model::record::{DeadlineRecord, records_from_values};
use crate::storage::KeyValueStore;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::sync::Arc;

pub const CUSTOM_DEADLINES_SUFFIX: &str = "custom_deadlines";

pub fn local_key(namespace: &str) -> String {
    format!("{}:{}", namespace, CUSTOM_DEADLINES_SUFFIX)
}

/// Normalizes a submitted datetime the way the deadline server stores it:
/// `T` becomes a space, a trailing `Z` is dropped and a value ending at the
/// minutes gets `:00` seconds.
pub fn normalize_submitted_datetime(raw: &str) -> String {
    let mut dt = raw.trim().replacen('T', " ", 1);
    if NaiveDateTime::parse_from_str(&dt, "%Y-%m-%d %H:%M").is_ok() && dt.len() == 16 {
        dt.push_str(":00");
    }
    if let Some(stripped) = dt.strip_suffix('Z') {
        dt = stripped.to_string();
    }
    dt
}

#[derive(Debug, Clone)]
pub struct LocalDeadlines {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalDeadlines {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &str) -> Self {
        Self {
            store,
            key: local_key(namespace),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored list. Absent means empty; a value that is not a
    /// JSON array is an error, individual bad entries are skipped.
    pub fn load(&self) -> Result<Vec<DeadlineRecord>, StorageError> {
        decode(&self.key, self.store.get(&self.key)?)
    }

    pub fn save(&self, records: &[DeadlineRecord]) -> Result<(), StorageError> {
        self.store.set(&self.key, &encode(&self.key, records)?)
    }

    /// Applies `op` to the stored list under the store's update lock.
    fn modify<T>(
        &self,
        op: impl FnOnce(&mut Vec<DeadlineRecord>) -> T,
    ) -> Result<T, StorageError> {
        let mut op = Some(op);
        let mut output = None;
        self.store.update(&self.key, &mut |raw| {
            let mut records = decode(&self.key, raw)?;
            if let Some(op) = op.take() {
                output = Some(op(&mut records));
            }
            encode(&self.key, &records)
        })?;
        output.ok_or_else(|| StorageError::Unavailable("update did not run".to_string()))
    }

    /// Appends a record, normalizing its datetime first. Returns the new
    /// number of stored records.
    pub fn add(&self, mut record: DeadlineRecord) -> Result<usize, StorageError> {
        record.datetime = record
            .datetime
            .as_deref()
            .map(normalize_submitted_datetime)
            .filter(|dt| !dt.is_empty());
        self.modify(|records| {
            records.push(record);
            records.len()
        })
    }

    /// Removes the record at `index` (position in the stored list).
    pub fn remove(&self, index: usize) -> Result<Option<DeadlineRecord>, StorageError> {
        self.modify(|records| (index < records.len()).then(|| records.remove(index)))
    }
}

fn decode(key: &str, raw: Option<String>) -> Result<Vec<DeadlineRecord>, StorageError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => Ok(records_from_values(items, "local")),
        Ok(_) => Err(StorageError::malformed(key, "expected a JSON array")),
        Err(e) => Err(StorageError::malformed(key, e)),
    }
}

fn encode(key: &str, records: &[DeadlineRecord]) -> Result<String, StorageError> {
    serde_json::to_string_pretty(records).map_err(|e| StorageError::malformed(key, e))
}
