use std::collections::HashSet;

use tracing::debug;

use crate::cache::store::RecordStore;
use crate::core::record::{FieldName, RecordData};
use crate::core::types::{RecordId, RecordKind};
use crate::remote::{decode, RecordSource, RemoteError};

/// Fills partial records from the remote source, at most one round trip
/// per identity per process lifetime.
///
/// Resolution is explicit: reading an `Unknown` field never fetches on its
/// own. Callers resolve first, then read. The guard set records an
/// identity only after a successful fetch, so a failed fetch leaves the
/// record partial and a later resolve may try again; "at most once" binds
/// the success path.
pub struct Resolver<'a> {
    source: &'a dyn RecordSource,
    fetched: HashSet<RecordId>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self {
            source,
            fetched: HashSet::new(),
        }
    }

    /// Make `field` of the record under `id` known.
    ///
    /// No-op when the record is already complete or the field is not in
    /// its missing set. Otherwise the record is re-fetched in full by
    /// identity, all fields repopulate, and the missing set clears.
    /// NotFound and transport errors propagate; the record stays partial.
    pub fn resolve(
        &mut self,
        store: &mut RecordStore,
        id: RecordId,
        field: FieldName,
    ) -> Result<(), RemoteError> {
        let needs_fetch = match store.get(&id) {
            Some(record) => record.is_partial() && record.is_missing(field),
            None => true,
        };
        if !needs_fetch || self.fetched.contains(&id) {
            return Ok(());
        }
        self.fetch_into(store, id)
    }

    /// Re-fetch regardless of the at-most-once guard and current state
    pub fn resolve_forced(
        &mut self,
        store: &mut RecordStore,
        id: RecordId,
    ) -> Result<(), RemoteError> {
        self.fetched.remove(&id);
        self.fetch_into(store, id)
    }

    /// Fetch a batch of records by id list and register them
    pub fn fetch_by_ids_into(
        &mut self,
        store: &mut RecordStore,
        kind: RecordKind,
        ids: &[u32],
    ) -> Result<usize, RemoteError> {
        let payloads = self.source.fetch_by_ids(kind, ids)?;
        let mut stored = 0;
        for payload in &payloads {
            self.store_payload(store, kind, payload)?;
            stored += 1;
        }
        Ok(stored)
    }

    /// Fetch every record of a kind; returns the full matching id set
    pub fn fetch_all_into(
        &mut self,
        store: &mut RecordStore,
        kind: RecordKind,
    ) -> Result<Vec<u32>, RemoteError> {
        let all = self.source.fetch_all(kind)?;
        debug!(kind = %kind, records = all.records.len(), "fetched all records");
        for payload in &all.records {
            self.store_payload(store, kind, payload)?;
        }
        Ok(all.all_ids)
    }

    fn fetch_into(&mut self, store: &mut RecordStore, id: RecordId) -> Result<(), RemoteError> {
        debug!(id = %id, "resolving record from remote source");
        let payload = self.source.fetch_by_id(id.kind, id.id)?;
        self.store_payload(store, id.kind, &payload)?;
        Ok(())
    }

    fn store_payload(
        &mut self,
        store: &mut RecordStore,
        kind: RecordKind,
        payload: &serde_json::Value,
    ) -> Result<(), RemoteError> {
        let mut decoded = decode(kind, payload)?;

        // Referenced identities attach as stubs by identity shape only;
        // resolving them is deferred to their own first access.
        store.register_stubs(&decoded.references);
        intern_attributes(store, &mut decoded.record.data);

        let id = decoded.record.id;
        store.put(decoded.record);
        self.fetched.insert(id);
        Ok(())
    }
}

/// Swap embedded attribute values for their canonical deduplicated copies
fn intern_attributes(store: &mut RecordStore, data: &mut RecordData) {
    use crate::core::record::Field;

    let (drugs, disease) = match data {
        RecordData::Evidence(e) => (&mut e.drugs, &mut e.disease),
        RecordData::Assertion(a) => (&mut a.drugs, &mut a.disease),
        _ => return,
    };
    if let Field::Known(drugs) = drugs {
        for drug in drugs.iter_mut() {
            *drug = store.intern_attribute(drug.clone());
        }
    }
    if let Field::Known(Some(disease)) = disease {
        *disease = store.intern_attribute(disease.clone());
    }
}
