use std::collections::HashSet;

use crate::cache::store::RecordStore;
use crate::core::query::{CoordinateQuery, QueryError};
use crate::core::record::Record;
use crate::core::types::SearchMode;
use crate::index::CoordinateIndex;
use crate::search::{builds, row_matches};

/// Answer one coordinate query against the index.
///
/// The candidate set is the intersection of three binary-searched
/// projections: rows on the query chromosome, rows starting at or before
/// the query stop, and rows stopping at or after the query start. The
/// four-mode filter then runs over the candidates, and surviving rows
/// deduplicate by record identity before resolving through the store.
pub fn search_by_coordinates<'a>(
    store: &'a RecordStore,
    index: &CoordinateIndex,
    query: &CoordinateQuery,
    mode: SearchMode,
) -> Result<Vec<&'a Record>, QueryError> {
    query.validate(mode)?;

    let Some(effective) = builds::translate(query) else {
        // Off-build locus with no fixed translation: nothing can match
        return Ok(Vec::new());
    };

    let on_chromosome: HashSet<usize> = index
        .positions_on_chromosome(&effective.chromosome)
        .iter()
        .copied()
        .collect();
    let starting_early: HashSet<usize> = index
        .positions_starting_at_or_before(effective.stop)
        .iter()
        .copied()
        .collect();
    let stopping_late: HashSet<usize> = index
        .positions_stopping_at_or_after(effective.start)
        .iter()
        .copied()
        .collect();

    let mut candidates: Vec<usize> = on_chromosome
        .iter()
        .filter(|i| starting_early.contains(i) && stopping_late.contains(i))
        .copied()
        .collect();
    candidates.sort_unstable();

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for i in candidates {
        let row = &index.rows()[i];
        if !row_matches(&effective, row, mode) {
            continue;
        }
        if seen.insert(row.record) {
            if let Some(record) = store.get(&row.record) {
                results.push(record);
            }
        }
    }
    Ok(results)
}
