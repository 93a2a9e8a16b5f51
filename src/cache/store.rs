use std::collections::HashMap;

use tracing::trace;

use crate::core::attribute::AttributeValue;
use crate::core::record::{Field, Record, RecordData};
use crate::core::types::{RecordId, RecordKind, StatusFilter};

/// Identity-keyed arena of records.
///
/// All cross-references between records are stored as [`RecordId`] values
/// and resolved through this store, so the cyclic variant/gene/evidence
/// graph carries no ownership cycles. The store has an explicit
/// construction/reload lifecycle and is passed by reference, never held as
/// ambient state.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<RecordId, Record>,

    /// Canonical attribute values, deduplicated by (category, id).
    /// Values without an id never land here.
    attributes: HashMap<(String, u32), AttributeValue>,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &RecordId) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    /// Insert or replace a record under its identity.
    ///
    /// Completeness is monotonic: a partial record never replaces a
    /// complete one under the same identity (the partial put is silently
    /// ignored). A partial record inserts only when the identity is absent
    /// entirely, which is how relational stubs register. Returns whether
    /// the store changed.
    pub fn put(&mut self, record: Record) -> bool {
        match self.records.get(&record.id) {
            Some(existing) if record.is_partial() && !existing.is_partial() => {
                trace!(id = %record.id, "ignoring partial put over complete record");
                false
            }
            Some(_) if record.is_partial() => false,
            _ => {
                self.records.insert(record.id, record);
                true
            }
        }
    }

    /// Register a stub for every referenced identity not yet present
    pub fn register_stubs(&mut self, references: &[RecordId]) {
        for id in references {
            if !self.records.contains_key(id) {
                self.records.insert(*id, Record::stub(*id));
            }
        }
    }

    /// Canonicalize an attribute value: values carrying an id merge into
    /// the deduplication table; anonymous values pass through untouched.
    pub fn intern_attribute(&mut self, value: AttributeValue) -> AttributeValue {
        match value.dedup_key() {
            Some(key) => self.attributes.entry(key).or_insert(value).clone(),
            None => value,
        }
    }

    /// All ids of a kind currently registered, sorted
    #[must_use]
    pub fn ids_of_kind(&self, kind: RecordKind) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .records
            .keys()
            .filter(|id| id.kind == kind)
            .map(|id| id.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All complete records of a kind
    pub fn complete_of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records
            .values()
            .filter(move |r| r.kind() == kind && !r.is_partial())
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // === Status-filtered visibility reads ===
    //
    // The filter is applied at read time; the unfiltered children stay
    // cached. A child whose status is still unknown is not visible until
    // resolved.

    /// Evidence children of a variant whose status passes the filter
    #[must_use]
    pub fn visible_evidence(&self, variant: &RecordId, filter: &StatusFilter) -> Vec<&Record> {
        let Some(RecordData::Variant(data)) = self.records.get(variant).map(|r| &r.data) else {
            return Vec::new();
        };
        let Field::Known(children) = &data.evidence else {
            return Vec::new();
        };
        self.filter_by_status(children, filter)
    }

    /// Assertion children of a variant whose status passes the filter
    #[must_use]
    pub fn visible_assertions(&self, variant: &RecordId, filter: &StatusFilter) -> Vec<&Record> {
        let Some(RecordData::Variant(data)) = self.records.get(variant).map(|r| &r.data) else {
            return Vec::new();
        };
        let Field::Known(children) = &data.assertions else {
            return Vec::new();
        };
        self.filter_by_status(children, filter)
    }

    /// Variants of a gene that have at least one visible evidence item,
    /// with the status filter applied recursively
    #[must_use]
    pub fn visible_variants(&self, gene: &RecordId, filter: &StatusFilter) -> Vec<&Record> {
        let Some(RecordData::Gene(data)) = self.records.get(gene).map(|r| &r.data) else {
            return Vec::new();
        };
        let Field::Known(variants) = &data.variants else {
            return Vec::new();
        };
        variants
            .iter()
            .filter(|vid| !self.visible_evidence(vid, filter).is_empty())
            .filter_map(|vid| self.records.get(vid))
            .collect()
    }

    fn filter_by_status(&self, children: &[RecordId], filter: &StatusFilter) -> Vec<&Record> {
        children
            .iter()
            .filter_map(|cid| self.records.get(cid))
            .filter(|child| {
                let status = match &child.data {
                    RecordData::Evidence(e) => e.status.known(),
                    RecordData::Assertion(a) => a.status.known(),
                    _ => None,
                };
                status.is_some_and(|s| filter.allows(*s))
            })
            .collect()
    }
}
