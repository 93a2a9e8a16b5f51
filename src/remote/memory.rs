use std::cell::Cell;
use std::collections::BTreeMap;

use crate::core::types::RecordKind;
use crate::remote::source::{FetchAll, RecordSource, RemoteError};

/// In-memory record source over canned JSON payloads.
///
/// Used by the test suite and by offline tooling; it also counts fetches
/// so the resolver's at-most-once guarantee is observable.
#[derive(Debug, Default)]
pub struct MemorySource {
    payloads: BTreeMap<(RecordKind, u32), serde_json::Value>,
    fetches: Cell<usize>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payload; its `id` field keys it
    pub fn insert(&mut self, kind: RecordKind, payload: serde_json::Value) {
        let id = payload
            .get("id")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .expect("memory source payloads carry an integer 'id'");
        self.payloads.insert((kind, id), payload);
    }

    /// Number of fetch calls served so far, across all three methods
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl RecordSource for MemorySource {
    fn fetch_by_id(&self, kind: RecordKind, id: u32) -> Result<serde_json::Value, RemoteError> {
        self.fetches.set(self.fetches.get() + 1);
        self.payloads
            .get(&(kind, id))
            .cloned()
            .ok_or(RemoteError::NotFound { kind, id })
    }

    fn fetch_by_ids(
        &self,
        kind: RecordKind,
        ids: &[u32],
    ) -> Result<Vec<serde_json::Value>, RemoteError> {
        if !kind.supports_id_list_fetch() {
            return Err(RemoteError::Unsupported { kind });
        }
        self.fetches.set(self.fetches.get() + 1);
        Ok(ids
            .iter()
            .filter_map(|id| self.payloads.get(&(kind, *id)).cloned())
            .collect())
    }

    fn fetch_all(&self, kind: RecordKind) -> Result<FetchAll, RemoteError> {
        self.fetches.set(self.fetches.get() + 1);
        let mut result = FetchAll::default();
        for ((k, id), payload) in &self.payloads {
            if *k == kind {
                result.all_ids.push(*id);
                result.records.push(payload.clone());
            }
        }
        Ok(result)
    }
}
