// File: src/controller.rs
//! Render-cycle controller for the deadline board.
//! Every front end goes through `Board`: it loads the catalog, resolves the
//! dynamic source (remote, else local), merges, and hands out ordered and
//! filtered views together with the persisted tag selection.
use crate::cache::LocalDeadlines;
use crate::client::{DeadlineSource, RemoteClient};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::{FetchError, StorageError};
use crate::merge::{DynamicSource, merge};
use crate::model::entry::Entry;
use crate::model::filter::{TagSelection, toggle, visible};
use crate::model::normalize::normalize_catalog_all;
use crate::model::order::order;
use crate::model::parser::Zone;
use crate::model::record::{Catalog, DeadlineRecord, TagType};
use crate::storage::{FileStore, KeyValueStore};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic render-cycle counter. A cycle whose ticket is no longer the
/// latest when its fetch resolves must discard its result.
#[derive(Debug, Default)]
pub struct FetchGeneration(AtomicU64);

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation and returns its ticket.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current() == ticket
    }
}

/// Where the catalog of a render cycle comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Re-read at the start of every cycle; a missing or broken file means
    /// an empty catalog.
    File(PathBuf),
    Fixed(Catalog),
}

impl CatalogSource {
    pub fn load(&self) -> Catalog {
        match self {
            CatalogSource::Fixed(catalog) => catalog.clone(),
            CatalogSource::File(path) => match Catalog::load(path) {
                Ok(catalog) => catalog,
                Err(e) => {
                    log::warn!("Using an empty catalog: {:#}", e);
                    Catalog::default()
                }
            },
        }
    }
}

/// Result of one completed render cycle. Owns the unified collection;
/// ordering and filtering hand out borrowed views.
#[derive(Debug, Clone)]
pub struct Render {
    pub entries: Vec<Entry>,
    pub now: DateTime<Utc>,
    pub source: DynamicSource,
    pub selection: TagSelection,
    pub all_tags: Vec<String>,
}

impl Render {
    pub fn ordered(&self) -> Vec<&Entry> {
        order(&self.entries, self.now)
    }

    /// The ordered view restricted to entries passing the tag filter.
    pub fn visible(&self) -> Vec<&Entry> {
        visible(&self.ordered(), &self.selection, &self.all_tags)
    }
}

#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Fresh(Render),
    /// A newer cycle started while this one was fetching.
    Stale,
}

impl RenderOutcome {
    pub fn into_render(self) -> Option<Render> {
        match self {
            RenderOutcome::Fresh(render) => Some(render),
            RenderOutcome::Stale => None,
        }
    }
}

#[derive(Debug)]
pub struct Board<R = RemoteClient> {
    config: Config,
    catalog: CatalogSource,
    zone: Zone,
    remote: Option<R>,
    store: Arc<dyn KeyValueStore>,
    local: LocalDeadlines,
    generation: FetchGeneration,
}

impl Board<RemoteClient> {
    /// Production wiring: file-backed store under the data directory, catalog
    /// from the configured path, remote client unless offline.
    pub fn open(ctx: &dyn AppContext, config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(ctx)?);
        let catalog = CatalogSource::File(config.catalog_path(ctx)?);
        let remote = if config.is_offline() {
            log::info!("No remote_url configured, using local deadlines only");
            None
        } else {
            match RemoteClient::from_config(&config) {
                Ok(client) => Some(client),
                Err(e) => {
                    log::warn!("Remote store disabled: {}", e);
                    None
                }
            }
        };
        Ok(Self::new(config, catalog, remote, store))
    }
}

impl<R: DeadlineSource> Board<R> {
    pub fn new(
        config: Config,
        catalog: CatalogSource,
        remote: Option<R>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let zone = config.user_zone().unwrap_or_else(|e| {
            log::warn!("Falling back to the local timezone: {}", e);
            Zone::Local
        });
        let local = LocalDeadlines::new(store.clone(), &config.namespace);
        Self {
            config,
            catalog,
            zone,
            remote,
            store,
            local,
            generation: FetchGeneration::new(),
        }
    }

    /// Zone used for naive user datetimes and for displaying instants.
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn remote(&self) -> Option<&R> {
        self.remote.as_ref()
    }

    pub fn generation(&self) -> &FetchGeneration {
        &self.generation
    }

    pub fn all_tags(&self) -> Vec<String> {
        self.catalog.load().all_tags()
    }

    pub fn tag_types(&self) -> Vec<TagType> {
        self.catalog.load().types
    }

    /// Runs one cycle. The remote fetch is the only await point.
    pub async fn render(&self, now: DateTime<Utc>) -> RenderOutcome {
        let ticket = self.generation.begin();
        let catalog = self.catalog.load();
        let all_tags = catalog.all_tags();
        let catalog_entries = normalize_catalog_all(&catalog.conferences);

        let remote = async {
            match &self.remote {
                Some(source) => source.fetch_deadlines().await,
                None => Err(FetchError::Offline),
            }
        };
        let merged = merge(catalog_entries, remote, || self.local.load(), &self.zone).await;

        if !self.generation.is_current(ticket) {
            log::debug!(
                "Discarding render #{} (current is #{})",
                ticket,
                self.generation.current()
            );
            return RenderOutcome::Stale;
        }

        log::debug!(
            "Render #{}: {} entries, dynamic source {}",
            ticket,
            merged.entries.len(),
            merged.source
        );
        let selection = self.selection(&all_tags);
        RenderOutcome::Fresh(Render {
            entries: merged.entries,
            now,
            source: merged.source,
            selection,
            all_tags,
        })
    }

    /// The persisted tag selection. On first use the default (nothing
    /// selected) is written back.
    pub fn selection(&self, all_tags: &[String]) -> TagSelection {
        let key = self.config.selection_key();
        if let Ok(None) = self.store.get(key) {
            let default = TagSelection::new(all_tags);
            if let Err(e) = default.save(self.store.as_ref(), key, all_tags) {
                log::warn!("Could not persist the default tag selection: {}", e);
            }
            return default;
        }
        TagSelection::load(self.store.as_ref(), key, all_tags)
    }

    /// Flips `tag` and persists the result.
    pub fn toggle_tag(&self, tag: &str) -> Result<TagSelection, StorageError> {
        let all_tags = self.all_tags();
        let selection = toggle(tag, self.selection(&all_tags));
        selection.save(self.store.as_ref(), self.config.selection_key(), &all_tags)?;
        Ok(selection)
    }

    pub fn local_records(&self) -> Result<Vec<DeadlineRecord>, StorageError> {
        self.local.load()
    }

    pub fn add_local(&self, record: DeadlineRecord) -> Result<usize, StorageError> {
        self.local.add(record)
    }

    pub fn remove_local(&self, index: usize) -> Result<Option<DeadlineRecord>, StorageError> {
        self.local.remove(index)
    }
}
