use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::resolver::Resolver;
use crate::cache::snapshot::{CacheSnapshot, SnapshotError};
use crate::cache::store::RecordStore;
use crate::core::record::RecordData;
use crate::core::types::{RecordId, RecordKind};
use crate::index::CoordinateIndex;
use crate::remote::{RecordSource, RemoteError};

/// Default maximum age of a full snapshot before it counts as stale
pub const DEFAULT_STALENESS_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error(
        "cache at {path} is stale and this passive load cannot fall back to a remote refresh; \
         run a hard update instead"
    )]
    StaleCacheConflict { path: PathBuf },
}

/// What to do when a loaded snapshot turns out to be stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnStale {
    /// Accept the snapshot regardless of freshness
    Ignore,
    /// Discard it and refresh in full from the remote source
    Update,
    /// Discard it and report failure, leaving any active cache untouched
    Reject,
    /// `Update` at the canonical local path, `Reject` elsewhere
    Auto,
}

/// Outcome of a cache load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot exists at the given path
    NoCache,
    /// Snapshot accepted within the staleness threshold (or freshly rebuilt)
    LoadedFresh,
    /// Stale snapshot accepted under `OnStale::Ignore`
    LoadedStale,
    /// Stale snapshot discarded; the previously active cache is untouched
    Rejected,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Canonical local snapshot path
    pub local_path: PathBuf,
    /// Where a prebuilt snapshot can be downloaded from
    pub remote_snapshot_url: String,
    pub staleness_days: i64,
}

impl CacheConfig {
    pub fn new(local_path: impl Into<PathBuf>, remote_snapshot_url: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_snapshot_url: remote_snapshot_url.into(),
            staleness_days: DEFAULT_STALENESS_DAYS,
        }
    }

    #[must_use]
    pub fn with_staleness_days(mut self, days: i64) -> Self {
        self.staleness_days = days;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        Self::new(
            home.join(".varkb").join("cache.bin.gz"),
            "https://knowledgebase.example.org/downloads/cache.bin.gz",
        )
    }
}

/// Summary of the active cache for the command surface
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStatus {
    pub records: usize,
    pub variants: usize,
    pub indexed_rows: usize,
    pub full_snapshot_at: Option<DateTime<Utc>>,
    pub fresh: bool,
}

/// The active cache: store, coordinate index, and snapshot freshness.
///
/// Mutation (loading, refreshing) takes `&mut self` and searches take
/// `&self`, which makes the single-writer discipline of the store and the
/// index's sortedness invariant explicit in the type system.
pub struct Cache {
    config: CacheConfig,
    store: RecordStore,
    index: CoordinateIndex,
    full_snapshot_at: Option<DateTime<Utc>>,
}

impl Cache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: RecordStore::new(),
            index: CoordinateIndex::default(),
            full_snapshot_at: None,
        }
    }

    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    #[must_use]
    pub fn index(&self) -> &CoordinateIndex {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn full_snapshot_at(&self) -> Option<DateTime<Utc>> {
        self.full_snapshot_at
    }

    /// Freshness predicate: a full-snapshot timestamp exists and is
    /// younger than the staleness threshold
    #[must_use]
    pub fn is_fresh_timestamp(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        timestamp.is_some_and(|ts| {
            Utc::now().signed_duration_since(ts) < Duration::days(self.config.staleness_days)
        })
    }

    #[must_use]
    pub fn status(&self) -> CacheStatus {
        CacheStatus {
            records: self.store.len(),
            variants: self.store.complete_of_kind(RecordKind::Variant).count(),
            indexed_rows: self.index.len(),
            full_snapshot_at: self.full_snapshot_at,
            fresh: self.is_fresh_timestamp(self.full_snapshot_at),
        }
    }

    /// Load a snapshot, reconciling staleness against the given policy.
    ///
    /// A stale snapshot under `Update` (or `Auto` at the canonical path)
    /// is discarded and replaced by a full remote refresh, which is then
    /// persisted back to the canonical path.
    pub fn load(
        &mut self,
        path: &Path,
        on_stale: OnStale,
        source: &dyn RecordSource,
    ) -> Result<LoadOutcome, CacheError> {
        self.load_impl(path, on_stale, Some(source))
    }

    /// Load without any remote fallback.
    ///
    /// When the policy would demand a refresh this is a configuration
    /// error, not ordinary staleness: the caller just placed or downloaded
    /// the snapshot and a refresh loop must abort instead of spinning.
    pub fn load_passive(&mut self, path: &Path, on_stale: OnStale) -> Result<LoadOutcome, CacheError> {
        self.load_impl(path, on_stale, None)
    }

    fn load_impl(
        &mut self,
        path: &Path,
        on_stale: OnStale,
        source: Option<&dyn RecordSource>,
    ) -> Result<LoadOutcome, CacheError> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot at path");
            return Ok(LoadOutcome::NoCache);
        }

        let snapshot = CacheSnapshot::load(path)?;
        let fresh = self.is_fresh_timestamp(snapshot.full_snapshot_at);

        if fresh {
            self.adopt(snapshot);
            return Ok(LoadOutcome::LoadedFresh);
        }

        match on_stale {
            OnStale::Ignore => {
                info!(path = %path.display(), "accepting stale snapshot as-is");
                self.adopt(snapshot);
                Ok(LoadOutcome::LoadedStale)
            }
            OnStale::Update => self.refresh_after_stale(path, source),
            OnStale::Auto if path == self.config.local_path => {
                self.refresh_after_stale(path, source)
            }
            OnStale::Reject | OnStale::Auto => {
                warn!(path = %path.display(), "rejecting stale snapshot");
                Ok(LoadOutcome::Rejected)
            }
        }
    }

    fn refresh_after_stale(
        &mut self,
        path: &Path,
        source: Option<&dyn RecordSource>,
    ) -> Result<LoadOutcome, CacheError> {
        let Some(source) = source else {
            return Err(CacheError::StaleCacheConflict {
                path: path.to_path_buf(),
            });
        };
        info!(path = %path.display(), "snapshot stale, refreshing from remote source");
        self.refresh(source)?;
        Ok(LoadOutcome::LoadedFresh)
    }

    /// Full refresh: fetch every record of every kind, stamp a new
    /// full-snapshot timestamp, rebuild the coordinate index, and persist
    /// to the canonical path.
    pub fn refresh(&mut self, source: &dyn RecordSource) -> Result<(), CacheError> {
        let mut store = RecordStore::new();
        let mut resolver = Resolver::new(source);
        for kind in RecordKind::ALL {
            let ids = resolver.fetch_all_into(&mut store, kind)?;
            info!(kind = %kind, count = ids.len(), "refreshed kind");
        }

        self.store = store;
        self.full_snapshot_at = Some(Utc::now());
        self.index = CoordinateIndex::build(&self.store);
        self.save()?;
        Ok(())
    }

    /// Persist the active cache to the canonical path
    pub fn save(&self) -> Result<(), CacheError> {
        CacheSnapshot::capture(&self.store, self.full_snapshot_at)
            .save(&self.config.local_path)?;
        debug!(path = %self.config.local_path.display(), "snapshot saved");
        Ok(())
    }

    /// Download the prebuilt snapshot to the canonical path
    pub fn download_snapshot(&self) -> Result<(), CacheError> {
        info!(url = %self.config.remote_snapshot_url, "downloading snapshot");
        let response = reqwest::blocking::get(&self.config.remote_snapshot_url)?
            .error_for_status()?;
        let bytes = response.bytes()?;
        if let Some(parent) = self.config.local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config.local_path, &bytes)?;
        Ok(())
    }

    /// Adopt a loaded snapshot: rehydrate records, normalize
    /// cross-references with one shallow pass, and rebuild the index from
    /// the variant set
    fn adopt(&mut self, snapshot: CacheSnapshot) {
        let mut store = RecordStore::new();
        for record in snapshot.records {
            store.put(record);
        }
        normalize_references(&mut store);

        self.full_snapshot_at = snapshot.full_snapshot_at;
        self.index = CoordinateIndex::build(&store);
        self.store = store;
    }
}

/// Shallow relational pass after deserialization: make sure every identity
/// a record references exists in the store, registering stubs for the rest
fn normalize_references(store: &mut RecordStore) {
    let mut referenced: Vec<RecordId> = Vec::new();
    for record in store.records() {
        collect_references(&record.data, &mut referenced);
    }
    store.register_stubs(&referenced);
}

fn collect_references(data: &RecordData, out: &mut Vec<RecordId>) {
    use crate::core::record::Field;

    match data {
        RecordData::Gene(g) => {
            if let Field::Known(variants) = &g.variants {
                out.extend(variants.iter().copied());
            }
        }
        RecordData::Variant(v) => {
            if let Field::Known(gene) = &v.gene {
                out.push(*gene);
            }
            if let Field::Known(evidence) = &v.evidence {
                out.extend(evidence.iter().copied());
            }
            if let Field::Known(assertions) = &v.assertions {
                out.extend(assertions.iter().copied());
            }
        }
        RecordData::Evidence(e) => {
            if let Field::Known(variant) = &e.variant {
                out.push(*variant);
            }
            if let Field::Known(Some(src)) = &e.source {
                out.push(*src);
            }
        }
        RecordData::Assertion(a) => {
            if let Field::Known(variant) = &a.variant {
                out.push(*variant);
            }
            if let Field::Known(gene) = &a.gene {
                out.push(*gene);
            }
        }
        RecordData::Source(_) => {}
    }
}
