use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The kinds of records the knowledgebase serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Gene,
    Variant,
    Evidence,
    Assertion,
    Source,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Gene,
        RecordKind::Variant,
        RecordKind::Evidence,
        RecordKind::Assertion,
        RecordKind::Source,
    ];

    /// Path segment used by the remote API for this kind
    #[must_use]
    pub fn api_path(self) -> &'static str {
        match self {
            Self::Gene => "genes",
            Self::Variant => "variants",
            Self::Evidence => "evidence_items",
            Self::Assertion => "assertions",
            Self::Source => "sources",
        }
    }

    /// Kinds that only support "fetch all" on the search endpoint
    #[must_use]
    pub fn supports_id_list_fetch(self) -> bool {
        !matches!(self, Self::Source)
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gene => write!(f, "gene"),
            Self::Variant => write!(f, "variant"),
            Self::Evidence => write!(f, "evidence"),
            Self::Assertion => write!(f, "assertion"),
            Self::Source => write!(f, "source"),
        }
    }
}

/// Identity of a cacheable record: kind plus numeric id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub kind: RecordKind,
    pub id: u32,
}

impl RecordId {
    #[must_use]
    pub fn new(kind: RecordKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Reference genome build a coordinate query is expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceBuild {
    /// The build all indexed coordinates are stored in
    #[default]
    Grch37,
    Grch38,
    Ncbi36,
}

impl ReferenceBuild {
    #[must_use]
    pub fn is_default(self) -> bool {
        matches!(self, Self::Grch37)
    }
}

impl std::fmt::Display for ReferenceBuild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grch37 => write!(f, "GRCh37"),
            Self::Grch38 => write!(f, "GRCh38"),
            Self::Ncbi36 => write!(f, "NCBI36"),
        }
    }
}

/// Interval-matching semantics for coordinate search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Any overlap between query and indexed interval
    Any,
    /// Indexed interval contained within the query interval
    QueryEncompassing,
    /// Query interval contained within the indexed interval
    RecordEncompassing,
    /// Identical interval, with allele columns matched when supplied
    Exact,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::QueryEncompassing => write!(f, "query_encompassing"),
            Self::RecordEncompassing => write!(f, "record_encompassing"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// Curation status of an evidence item or assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Accepted,
    Submitted,
    Rejected,
}

impl EvidenceStatus {
    pub const ALL: [EvidenceStatus; 3] = [
        EvidenceStatus::Accepted,
        EvidenceStatus::Submitted,
        EvidenceStatus::Rejected,
    ];

    /// Parse a status from its wire representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "submitted" => Some(Self::Submitted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Submitted => write!(f, "submitted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Read-time allow-set over evidence/assertion statuses.
///
/// Visibility filtering is a query parameter, not stored state: the
/// underlying unfiltered children stay cached and the filter is applied
/// on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFilter {
    allow: BTreeSet<EvidenceStatus>,
}

impl StatusFilter {
    /// Allow only the given statuses
    #[must_use]
    pub fn only(statuses: &[EvidenceStatus]) -> Self {
        Self {
            allow: statuses.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn allows(&self, status: EvidenceStatus) -> bool {
        self.allow.contains(&status)
    }
}

impl Default for StatusFilter {
    /// All three known statuses pass by default
    fn default() -> Self {
        Self::only(&EvidenceStatus::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        let id = RecordId::new(RecordKind::Variant, 12);
        assert_eq!(id.to_string(), "variant:12");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(EvidenceStatus::parse("Accepted"), Some(EvidenceStatus::Accepted));
        assert_eq!(EvidenceStatus::parse("REJECTED"), Some(EvidenceStatus::Rejected));
        assert_eq!(EvidenceStatus::parse("unknown"), None);
    }

    #[test]
    fn test_status_filter_default_allows_all() {
        let filter = StatusFilter::default();
        for status in EvidenceStatus::ALL {
            assert!(filter.allows(status));
        }
    }

    #[test]
    fn test_status_filter_only() {
        let filter = StatusFilter::only(&[EvidenceStatus::Accepted]);
        assert!(filter.allows(EvidenceStatus::Accepted));
        assert!(!filter.allows(EvidenceStatus::Submitted));
        assert!(!filter.allows(EvidenceStatus::Rejected));
    }

    #[test]
    fn test_source_kind_fetch_all_only() {
        assert!(!RecordKind::Source.supports_id_list_fetch());
        assert!(RecordKind::Variant.supports_id_list_fetch());
    }
}
