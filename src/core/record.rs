use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::attribute::AttributeValue;
use crate::core::types::{EvidenceStatus, RecordId, RecordKind};

/// Explicit two-state value for a lazily fetched field.
///
/// A field is either `Known` (populated from a fetch or a snapshot) or
/// `Unknown` (never fetched). Reading an `Unknown` field never triggers a
/// fetch on its own; callers go through the resolver first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field<T> {
    Known(T),
    Unknown,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<T> Field<T> {
    /// The value, if known
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Names of the lazily resolvable fields, used in missing-field sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Description,
    Aliases,
    Coordinates,
    VariantTypes,
    Gene,
    Variants,
    Variant,
    Evidence,
    Assertions,
    Status,
    Rating,
    Drugs,
    Disease,
    Source,
    Citation,
    Summary,
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Aliases => "aliases",
            Self::Coordinates => "coordinates",
            Self::VariantTypes => "variant_types",
            Self::Gene => "gene",
            Self::Variants => "variants",
            Self::Variant => "variant",
            Self::Evidence => "evidence",
            Self::Assertions => "assertions",
            Self::Status => "status",
            Self::Rating => "rating",
            Self::Drugs => "drugs",
            Self::Disease => "disease",
            Self::Source => "source",
            Self::Citation => "citation",
            Self::Summary => "summary",
        };
        write!(f, "{s}")
    }
}

/// Genomic coordinates carried by a variant.
///
/// The primary triple (chromosome, start, stop) places the variant on the
/// default build; rearrangement-style variants additionally carry a
/// secondary triple for their partner locus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Coordinates {
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub stop: Option<u64>,

    /// Variant allele
    #[serde(default)]
    pub alt: Option<String>,
    /// Reference allele
    #[serde(default)]
    pub ref_bases: Option<String>,

    /// Partner locus for rearrangements
    #[serde(default)]
    pub chromosome2: Option<String>,
    #[serde(default)]
    pub start2: Option<u64>,
    #[serde(default)]
    pub stop2: Option<u64>,
}

impl Coordinates {
    /// The primary triple when all three parts are present
    #[must_use]
    pub fn primary(&self) -> Option<(&str, u64, u64)> {
        match (&self.chromosome, self.start, self.stop) {
            (Some(chrom), Some(start), Some(stop)) => Some((chrom.as_str(), start, stop)),
            _ => None,
        }
    }

    /// The secondary triple when all three parts are present
    #[must_use]
    pub fn secondary(&self) -> Option<(&str, u64, u64)> {
        match (&self.chromosome2, self.start2, self.stop2) {
            (Some(chrom), Some(start), Some(stop)) => Some((chrom.as_str(), start, stop)),
            _ => None,
        }
    }
}

/// Variant payload: interval coordinates plus its relational neighborhood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VariantData {
    pub name: Field<String>,
    pub description: Field<String>,
    pub aliases: Field<Vec<String>>,
    pub coordinates: Field<Coordinates>,
    pub variant_types: Field<Vec<String>>,
    /// Owning gene, by identity
    pub gene: Field<RecordId>,
    /// Evidence children, by identity
    pub evidence: Field<Vec<RecordId>>,
    /// Assertion children, by identity
    pub assertions: Field<Vec<RecordId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeneData {
    pub name: Field<String>,
    pub description: Field<String>,
    pub aliases: Field<Vec<String>>,
    /// Variants of this gene, by identity
    pub variants: Field<Vec<RecordId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvidenceData {
    pub name: Field<String>,
    pub description: Field<String>,
    pub status: Field<EvidenceStatus>,
    pub rating: Field<Option<u8>>,
    pub drugs: Field<Vec<AttributeValue>>,
    pub disease: Field<Option<AttributeValue>>,
    /// Parent variant, by identity
    pub variant: Field<RecordId>,
    /// Literature source, by identity
    pub source: Field<Option<RecordId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssertionData {
    pub name: Field<String>,
    pub description: Field<String>,
    pub summary: Field<String>,
    pub status: Field<EvidenceStatus>,
    pub drugs: Field<Vec<AttributeValue>>,
    pub disease: Field<Option<AttributeValue>>,
    /// Subject variant, by identity
    pub variant: Field<RecordId>,
    /// Owning gene, by identity
    pub gene: Field<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceData {
    pub citation: Field<String>,
    pub name: Field<String>,
}

/// Per-kind payload of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordData {
    Gene(GeneData),
    Variant(VariantData),
    Evidence(EvidenceData),
    Assertion(AssertionData),
    Source(SourceData),
}

impl RecordData {
    /// Empty payload for a kind, every field `Unknown`
    #[must_use]
    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Gene => Self::Gene(GeneData::default()),
            RecordKind::Variant => Self::Variant(VariantData::default()),
            RecordKind::Evidence => Self::Evidence(EvidenceData::default()),
            RecordKind::Assertion => Self::Assertion(AssertionData::default()),
            RecordKind::Source => Self::Source(SourceData::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Gene(_) => RecordKind::Gene,
            Self::Variant(_) => RecordKind::Variant,
            Self::Evidence(_) => RecordKind::Evidence,
            Self::Assertion(_) => RecordKind::Assertion,
            Self::Source(_) => RecordKind::Source,
        }
    }

    pub fn as_variant(&self) -> Option<&VariantData> {
        match self {
            Self::Variant(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_gene(&self) -> Option<&GeneData> {
        match self {
            Self::Gene(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_evidence(&self) -> Option<&EvidenceData> {
        match self {
            Self::Evidence(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_assertion(&self) -> Option<&AssertionData> {
        match self {
            Self::Assertion(a) => Some(a),
            _ => None,
        }
    }
}

/// The full set of resolvable fields for a kind, used to initialize the
/// missing-field set of a stub
fn all_fields(kind: RecordKind) -> &'static [FieldName] {
    match kind {
        RecordKind::Gene => &[
            FieldName::Name,
            FieldName::Description,
            FieldName::Aliases,
            FieldName::Variants,
        ],
        RecordKind::Variant => &[
            FieldName::Name,
            FieldName::Description,
            FieldName::Aliases,
            FieldName::Coordinates,
            FieldName::VariantTypes,
            FieldName::Gene,
            FieldName::Evidence,
            FieldName::Assertions,
        ],
        RecordKind::Evidence => &[
            FieldName::Name,
            FieldName::Description,
            FieldName::Status,
            FieldName::Rating,
            FieldName::Drugs,
            FieldName::Disease,
            FieldName::Variant,
            FieldName::Source,
        ],
        RecordKind::Assertion => &[
            FieldName::Name,
            FieldName::Description,
            FieldName::Summary,
            FieldName::Status,
            FieldName::Drugs,
            FieldName::Disease,
            FieldName::Variant,
            FieldName::Gene,
        ],
        RecordKind::Source => &[FieldName::Citation, FieldName::Name],
    }
}

/// A cacheable domain entity with a stable (kind, id) identity.
///
/// Records start life either complete (decoded from a full remote payload)
/// or as partial stubs (referenced by another record before being fetched
/// themselves). A stub knows only its identity; every field is `Unknown`
/// and listed in the missing set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub data: RecordData,
    missing: BTreeSet<FieldName>,
}

impl Record {
    /// A complete record: payload fully populated, nothing missing
    #[must_use]
    pub fn complete(id: RecordId, data: RecordData) -> Self {
        debug_assert_eq!(id.kind, data.kind());
        Self {
            id,
            data,
            missing: BTreeSet::new(),
        }
    }

    /// A partial stub created from identity shape alone.
    ///
    /// Building a stub never re-enters construction of the referenced
    /// record, which is what keeps cyclic references (gene to variant to
    /// the same gene) from looping.
    #[must_use]
    pub fn stub(id: RecordId) -> Self {
        Self {
            id,
            data: RecordData::empty(id.kind),
            missing: all_fields(id.kind).iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.id.kind
    }

    /// True while any required field is unknown
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }

    #[must_use]
    pub fn is_missing(&self, field: FieldName) -> bool {
        self.missing.contains(&field)
    }

    pub fn missing_fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.missing.iter().copied()
    }

    /// Replace the payload with a fully fetched one and clear the missing set
    pub fn fill(&mut self, data: RecordData) {
        debug_assert_eq!(self.id.kind, data.kind());
        self.data = data;
        self.missing.clear();
    }

    /// A short human-readable label: the name when known, the identity
    /// otherwise
    #[must_use]
    pub fn label(&self) -> String {
        let name = match &self.data {
            RecordData::Gene(g) => g.name.known(),
            RecordData::Variant(v) => v.name.known(),
            RecordData::Evidence(e) => e.name.known(),
            RecordData::Assertion(a) => a.name.known(),
            RecordData::Source(s) => s.name.known(),
        };
        name.cloned().unwrap_or_else(|| self.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_is_partial_with_all_fields_missing() {
        let stub = Record::stub(RecordId::new(RecordKind::Variant, 12));
        assert!(stub.is_partial());
        assert!(stub.is_missing(FieldName::Coordinates));
        assert!(stub.is_missing(FieldName::Evidence));
        assert!(stub.data.as_variant().unwrap().name.is_unknown());
    }

    #[test]
    fn test_fill_clears_missing_set() {
        let mut stub = Record::stub(RecordId::new(RecordKind::Gene, 5));
        let mut data = GeneData::default();
        data.name = Field::Known("BRAF".to_string());
        stub.fill(RecordData::Gene(data));
        assert!(!stub.is_partial());
        assert_eq!(
            stub.data.as_gene().unwrap().name.known(),
            Some(&"BRAF".to_string())
        );
    }

    #[test]
    fn test_complete_record_is_not_partial() {
        let rec = Record::complete(
            RecordId::new(RecordKind::Source, 1),
            RecordData::Source(SourceData::default()),
        );
        assert!(!rec.is_partial());
    }

    #[test]
    fn test_label_falls_back_to_identity() {
        let stub = Record::stub(RecordId::new(RecordKind::Evidence, 99));
        assert_eq!(stub.label(), "evidence:99");
    }

    #[test]
    fn test_coordinates_primary_requires_all_three() {
        let mut coords = Coordinates::default();
        coords.chromosome = Some("7".to_string());
        coords.start = Some(140_453_136);
        assert!(coords.primary().is_none());
        coords.stop = Some(140_453_136);
        assert_eq!(coords.primary(), Some(("7", 140_453_136, 140_453_136)));
    }
}
