//! Coordinate search over the index: a single-query path backed by the
//! three sorted projections, and a bulk sweep that answers many pre-sorted
//! queries in one linear pass. For any sorted query list the two paths
//! return the same per-query identity sets.

pub mod builds;
pub mod single;
pub mod sweep;

use crate::core::query::{CoordinateQuery, WILDCARD};
use crate::core::types::SearchMode;
use crate::index::IndexRow;

pub use single::search_by_coordinates;
pub use sweep::bulk_search;

/// Allele column match: an absent query value is a wildcard on that column
/// only; the explicit `*` matches any non-empty candidate value.
fn allele_matches(query: Option<&str>, candidate: Option<&str>) -> bool {
    match query {
        None => true,
        Some(WILDCARD) => candidate.is_some_and(|c| !c.is_empty()),
        Some(q) => candidate == Some(q),
    }
}

/// The four interval-matching semantics, applied to a query/row pair whose
/// intervals already overlap on the same chromosome
fn row_matches(query: &CoordinateQuery, row: &IndexRow, mode: SearchMode) -> bool {
    match mode {
        SearchMode::Any => true,
        SearchMode::QueryEncompassing => row.start >= query.start && row.stop <= query.stop,
        SearchMode::RecordEncompassing => query.start >= row.start && query.stop <= row.stop,
        SearchMode::Exact => {
            row.start == query.start
                && row.stop == query.stop
                && allele_matches(query.alt.as_deref(), row.alt.as_deref())
                && allele_matches(query.ref_bases.as_deref(), row.ref_bases.as_deref())
        }
    }
}
