use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::cache::store::RecordStore;
use crate::core::record::Record;
use crate::core::types::{RecordId, RecordKind};

/// Snapshot format version for compatibility checking
pub const SNAPSHOT_VERSION: u32 = 2;

/// Metadata key carrying the full-snapshot timestamp
const META_FULL_SNAPSHOT_AT: &str = "full_snapshot_at";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] bincode::Error),

    #[error("snapshot entry under key '{key}' has the wrong value shape")]
    KeyShape { key: String },
}

/// On-disk entry key: either a well-known string metadata key or a record
/// identity. The dual-keyed shape is the compatibility contract of the
/// snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotKey {
    Meta(String),
    Record(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotValue {
    Ids(Vec<u32>),
    Timestamp(DateTime<Utc>),
    Record(Box<Record>),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBlob {
    version: u32,
    entries: Vec<(SnapshotKey, SnapshotValue)>,
}

/// A deserialized snapshot, metadata already separated from records
#[derive(Debug, Default)]
pub struct CacheSnapshot {
    pub records: Vec<Record>,
    /// Per-kind "all ids" metadata, as recorded at the last full refresh
    pub all_ids: BTreeMap<RecordKind, Vec<u32>>,
    /// When the last full snapshot was built; absent in snapshots that
    /// never completed a full refresh
    pub full_snapshot_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    /// Capture the current store contents plus metadata
    #[must_use]
    pub fn capture(store: &RecordStore, full_snapshot_at: Option<DateTime<Utc>>) -> Self {
        let mut all_ids = BTreeMap::new();
        for kind in RecordKind::ALL {
            all_ids.insert(kind, store.ids_of_kind(kind));
        }
        Self {
            records: store.records().cloned().collect(),
            all_ids,
            full_snapshot_at,
        }
    }

    /// Serialize to the canonical gzip-compressed dual-keyed blob
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut entries: Vec<(SnapshotKey, SnapshotValue)> = Vec::new();
        if let Some(ts) = self.full_snapshot_at {
            entries.push((
                SnapshotKey::Meta(META_FULL_SNAPSHOT_AT.to_string()),
                SnapshotValue::Timestamp(ts),
            ));
        }
        for (kind, ids) in &self.all_ids {
            entries.push((
                SnapshotKey::Meta(format!("all_ids:{kind}")),
                SnapshotValue::Ids(ids.clone()),
            ));
        }
        for record in &self.records {
            entries.push((
                SnapshotKey::Record(record.id),
                SnapshotValue::Record(Box::new(record.clone())),
            ));
        }

        let blob = SnapshotBlob {
            version: SNAPSHOT_VERSION,
            entries,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = GzEncoder::new(BufWriter::new(file), Compression::default());
        bincode::serialize_into(&mut writer, &blob)?;
        writer.finish()?;
        Ok(())
    }

    /// Deserialize a blob, separating string-keyed metadata from
    /// identity-keyed records before anything rehydrates
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let reader = GzDecoder::new(BufReader::new(file));
        let blob: SnapshotBlob = bincode::deserialize_from(reader)?;

        if blob.version != SNAPSHOT_VERSION {
            warn!(
                found = blob.version,
                expected = SNAPSHOT_VERSION,
                "snapshot version mismatch"
            );
        }

        let mut snapshot = Self::default();
        for (key, value) in blob.entries {
            match (key, value) {
                (SnapshotKey::Meta(key), SnapshotValue::Timestamp(ts))
                    if key == META_FULL_SNAPSHOT_AT =>
                {
                    snapshot.full_snapshot_at = Some(ts);
                }
                (SnapshotKey::Meta(key), SnapshotValue::Ids(ids)) => {
                    if let Some(kind) = key
                        .strip_prefix("all_ids:")
                        .and_then(|name| kind_from_name(name))
                    {
                        snapshot.all_ids.insert(kind, ids);
                    } else {
                        warn!(key, "ignoring unrecognized metadata key");
                    }
                }
                (SnapshotKey::Record(_), SnapshotValue::Record(record)) => {
                    snapshot.records.push(*record);
                }
                (SnapshotKey::Meta(key), _) => {
                    return Err(SnapshotError::KeyShape { key });
                }
                (SnapshotKey::Record(id), _) => {
                    return Err(SnapshotError::KeyShape { key: id.to_string() });
                }
            }
        }
        Ok(snapshot)
    }
}

fn kind_from_name(name: &str) -> Option<RecordKind> {
    match name {
        "gene" => Some(RecordKind::Gene),
        "variant" => Some(RecordKind::Variant),
        "evidence" => Some(RecordKind::Evidence),
        "assertion" => Some(RecordKind::Assertion),
        "source" => Some(RecordKind::Source),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Field, RecordData, VariantData};

    fn sample_store() -> RecordStore {
        let mut store = RecordStore::new();
        let mut data = VariantData::default();
        data.name = Field::Known("V600E".to_string());
        store.put(Record::complete(
            RecordId::new(RecordKind::Variant, 12),
            RecordData::Variant(data),
        ));
        store.put(Record::stub(RecordId::new(RecordKind::Gene, 5)));
        store
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin.gz");

        let store = sample_store();
        let stamped = Utc::now();
        CacheSnapshot::capture(&store, Some(stamped))
            .save(&path)
            .unwrap();

        let loaded = CacheSnapshot::load(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.full_snapshot_at, Some(stamped));
        assert_eq!(loaded.all_ids[&RecordKind::Variant], vec![12]);
        assert_eq!(loaded.all_ids[&RecordKind::Gene], vec![5]);
    }

    #[test]
    fn test_snapshot_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin.gz");

        CacheSnapshot::capture(&sample_store(), None)
            .save(&path)
            .unwrap();
        let loaded = CacheSnapshot::load(&path).unwrap();
        assert!(loaded.full_snapshot_at.is_none());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = CacheSnapshot::load(Path::new("/nonexistent/cache.bin.gz")).unwrap_err();
        assert!(matches!(err, SnapshotError::Read(_)));
    }
}
