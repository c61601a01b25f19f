// File: ./src/merge.rs
//! Reconciles catalog entries with the dynamic (remote or local) records.
//!
//! Resolution is two-staged: a successful remote fetch fully supersedes the
//! local list, which is only read when the remote path failed. The two are
//! never combined.
use crate::error::{FetchError, StorageError};
use crate::model::entry::{Entry, EntrySource};
use crate::model::normalize::normalize_dynamic_all;
use crate::model::parser::Zone;
use crate::model::record::DeadlineRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;

/// Which collaborator contributed the dynamic portion of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicSource {
    Remote,
    Local,
    None,
}

impl DynamicSource {
    pub fn entry_source(self) -> Option<EntrySource> {
        match self {
            DynamicSource::Remote => Some(EntrySource::Remote),
            DynamicSource::Local => Some(EntrySource::Local),
            DynamicSource::None => None,
        }
    }
}

impl std::fmt::Display for DynamicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DynamicSource::Remote => "remote",
            DynamicSource::Local => "local",
            DynamicSource::None => "none",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dynamic {
    pub source: DynamicSource,
    pub records: Vec<DeadlineRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub entries: Vec<Entry>,
    pub source: DynamicSource,
}

/// Picks the dynamic records of this render. `local` runs only when the
/// remote result is an error.
pub fn resolve_dynamic<F>(remote: Result<Vec<DeadlineRecord>, FetchError>, local: F) -> Dynamic
where
    F: FnOnce() -> Result<Vec<DeadlineRecord>, StorageError>,
{
    match remote {
        Ok(records) => Dynamic {
            source: DynamicSource::Remote,
            records,
        },
        Err(fetch_err) => {
            match fetch_err {
                FetchError::Offline => log::debug!("No remote store, reading local deadlines"),
                ref e => log::warn!("Remote fetch failed, falling back to local: {}", e),
            }
            match local() {
                Ok(records) => Dynamic {
                    source: DynamicSource::Local,
                    records,
                },
                Err(e) => {
                    log::warn!("Local deadlines unavailable: {}", e);
                    Dynamic {
                        source: DynamicSource::None,
                        records: Vec::new(),
                    }
                }
            }
        }
    }
}

/// Concatenates both lists and drops duplicate ids. A later duplicate
/// overwrites the value kept at the position of the first occurrence.
pub fn unify(catalog: Vec<Entry>, dynamic: Vec<Entry>) -> Vec<Entry> {
    let mut unified: Vec<Entry> = Vec::with_capacity(catalog.len() + dynamic.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in catalog.into_iter().chain(dynamic) {
        if let Some(&idx) = positions.get(&entry.id) {
            log::debug!("Entry '{}' overrides an earlier one", entry.id);
            unified[idx] = entry;
        } else {
            positions.insert(entry.id.clone(), unified.len());
            unified.push(entry);
        }
    }
    unified
}

/// Normalizes the resolved dynamic records and unifies them with the
/// catalog entries.
pub fn merge_resolved(catalog: Vec<Entry>, dynamic: Dynamic, zone: &Zone) -> Merged {
    let entries = match dynamic.source.entry_source() {
        Some(source) => normalize_dynamic_all(&dynamic.records, zone, source),
        None => Vec::new(),
    };
    Merged {
        entries: unify(catalog, entries),
        source: dynamic.source,
    }
}

/// Awaits the remote fetch, falls back to `local` on failure and returns
/// the unified collection.
pub async fn merge<Fut, F>(catalog: Vec<Entry>, remote: Fut, local: F, zone: &Zone) -> Merged
where
    Fut: Future<Output = Result<Vec<DeadlineRecord>, FetchError>>,
    F: FnOnce() -> Result<Vec<DeadlineRecord>, StorageError>,
{
    let remote_result = remote.await;
    merge_resolved(catalog, resolve_dynamic(remote_result, local), zone)
}
