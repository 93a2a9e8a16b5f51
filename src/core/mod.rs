//! Core data types for the knowledgebase cache.
//!
//! - [`Record`]: a cacheable domain entity with a (kind, id) identity
//! - [`Field`]: explicit Known/Unknown state for lazily fetched fields
//! - [`AttributeValue`]: leaf value objects (drugs, diseases) without record identity
//! - [`CoordinateQuery`]: a genomic interval plus optional alleles and build
//! - [`RecordId`], [`RecordKind`], [`SearchMode`], [`StatusFilter`]: identity and
//!   search vocabulary shared across the crate
//!
//! Cross-references between records are always stored as [`RecordId`] values
//! and resolved through the store, never as owning pointers, so the cyclic
//! variant/gene/evidence graph has no ownership cycles.

pub mod attribute;
pub mod query;
pub mod record;
pub mod types;

pub use attribute::AttributeValue;
pub use query::{CoordinateQuery, QueryError, WILDCARD};
pub use record::{Coordinates, Field, FieldName, Record, RecordData};
pub use types::{EvidenceStatus, RecordId, RecordKind, ReferenceBuild, SearchMode, StatusFilter};
