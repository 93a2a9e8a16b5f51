use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::query::{CoordinateQuery, QueryError};
use crate::core::types::SearchMode;
use crate::index::{CoordinateIndex, IndexRow};
use crate::search::{builds, row_matches};

/// Answer many pre-sorted queries against the index in one linear pass.
///
/// Queries must be sorted ascending by (chromosome, start, stop); unsorted
/// input is a checked precondition failure. Validation is identical to the
/// single-query path. Queries with at least one matching row appear in the
/// result map; queries with no matches have no entry.
///
/// The sweep keeps two monotone cursors plus a window bookmark: the
/// bookmark records the first row position overlapping the current query,
/// and advancing to the next query rewinds the row cursor there, so a row
/// matching several adjacent queries is never missed. Per-query results
/// equal the single-query path for every query in the batch.
pub fn bulk_search(
    index: &CoordinateIndex,
    queries: &[CoordinateQuery],
    mode: SearchMode,
) -> Result<HashMap<CoordinateQuery, Vec<IndexRow>>, QueryError> {
    for query in queries {
        query.validate(mode)?;
    }
    for (i, pair) in queries.windows(2).enumerate() {
        if pair[0].position() > pair[1].position() {
            return Err(QueryError::UnsortedBulkQueries { position: i + 1 });
        }
    }

    let mut results: HashMap<CoordinateQuery, Vec<IndexRow>> = HashMap::new();

    // Off-build queries are exact point lookups after translation; they
    // cannot ride the sweep because translated coordinates need not stay
    // in batch order. They run through the projection path instead.
    let sweep_queries: Vec<&CoordinateQuery> = queries
        .iter()
        .filter(|q| {
            if q.build.is_default() {
                true
            } else {
                match_translated(index, q, mode, &mut results);
                false
            }
        })
        .collect();

    let rows = index.rows();
    let mut qi = 0usize;
    let mut ri = 0usize;
    let mut window_start: Option<usize> = None;

    while qi < sweep_queries.len() {
        if ri >= rows.len() {
            // Row cursor exhausted; later queries may still match inside
            // the current window.
            match window_start.take() {
                Some(ws) => {
                    qi += 1;
                    ri = ws;
                }
                None => break,
            }
            continue;
        }

        let query = sweep_queries[qi];
        let row = &rows[ri];
        match query.chromosome.as_str().cmp(row.chromosome.as_str()) {
            Ordering::Less => {
                qi += 1;
                if let Some(ws) = window_start.take() {
                    ri = ws;
                }
            }
            Ordering::Greater => ri += 1,
            Ordering::Equal => {
                if query.start > row.stop {
                    ri += 1;
                } else if query.stop < row.start {
                    qi += 1;
                    if let Some(ws) = window_start.take() {
                        ri = ws;
                    }
                } else {
                    // Ranges overlap: bookmark the window and apply the
                    // mode predicate.
                    if window_start.is_none() {
                        window_start = Some(ri);
                    }
                    if row_matches(query, row, mode) {
                        results
                            .entry((*query).clone())
                            .or_default()
                            .push(row.clone());
                    }
                    ri += 1;
                }
            }
        }
    }

    Ok(results)
}

/// Projection-path lookup for a translated off-build query, keyed by the
/// original query
fn match_translated(
    index: &CoordinateIndex,
    original: &CoordinateQuery,
    mode: SearchMode,
    results: &mut HashMap<CoordinateQuery, Vec<IndexRow>>,
) {
    let Some(effective) = builds::translate(original) else {
        return;
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

    let mut candidates: Vec<usize> = index
        .positions_stopping_at_or_after(effective.start)
        .iter()
        .filter(|i| on_chromosome.contains(i) && starting_early.contains(i))
        .copied()
        .collect();
    candidates.sort_unstable();

    for i in candidates {
        let row = &index.rows()[i];
        if row_matches(&effective, row, mode) {
            results
                .entry(original.clone())
                .or_default()
                .push(row.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::RecordStore;
    use crate::core::record::{Coordinates, Field, Record, RecordData, VariantData};
    use crate::core::types::{RecordId, RecordKind, ReferenceBuild};

    fn put_variant(store: &mut RecordStore, id: u32, coords: Coordinates) {
        let mut data = VariantData::default();
        data.name = Field::Known(format!("variant-{id}"));
        data.coordinates = Field::Known(coords);
        store.put(Record::complete(
            RecordId::new(RecordKind::Variant, id),
            RecordData::Variant(data),
        ));
    }

    fn interval(chrom: &str, start: u64, stop: u64) -> Coordinates {
        Coordinates {
            chromosome: Some(chrom.to_string()),
            start: Some(start),
            stop: Some(stop),
            ..Default::default()
        }
    }

    fn snv(chrom: &str, pos: u64, alt: &str, ref_bases: &str) -> Coordinates {
        Coordinates {
            alt: Some(alt.to_string()),
            ref_bases: Some(ref_bases.to_string()),
            ..interval(chrom, pos, pos)
        }
    }

    fn fixture() -> CoordinateIndex {
        let mut store = RecordStore::new();
        put_variant(&mut store, 12, snv("7", 140_453_136, "T", "A"));
        put_variant(&mut store, 13, snv("7", 140_453_137, "C", "G"));
        put_variant(&mut store, 14, interval("7", 140_453_100, 140_453_200));
        put_variant(&mut store, 20, snv("12", 25_398_284, "T", "C"));
        CoordinateIndex::build(&store)
    }

    #[test]
    fn test_unsorted_batch_is_checked() {
        let index = fixture();
        let queries = vec![
            CoordinateQuery::new("12", 25_398_284, 25_398_284),
            CoordinateQuery::new("7", 140_453_136, 140_453_136),
        ];
        let err = bulk_search(&index, &queries, SearchMode::Any).unwrap_err();
        assert!(matches!(err, QueryError::UnsortedBulkQueries { position: 1 }));
    }

    #[test]
    fn test_one_row_matches_adjacent_queries() {
        let index = fixture();
        // Both queries overlap the spanning record 14
        let q1 = CoordinateQuery::new("7", 140_453_110, 140_453_120);
        let q2 = CoordinateQuery::new("7", 140_453_150, 140_453_160);
        let results = bulk_search(&index, &[q1.clone(), q2.clone()], SearchMode::Any).unwrap();

        let hit = |q: &CoordinateQuery| {
            results[q]
                .iter()
                .map(|r| r.record.id)
                .collect::<HashSet<_>>()
        };
        assert_eq!(hit(&q1), HashSet::from([14]));
        assert_eq!(hit(&q2), HashSet::from([14]));
    }

    #[test]
    fn test_bookmark_rewind_after_unmatched_overlap() {
        let index = fixture();
        // q1 overlaps row 12 but its alt differs, so exact mode yields no
        // hit; q2 then matches the same row and must not be skipped.
        let q1 = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("G");
        let q2 = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T");
        let results = bulk_search(&index, &[q1.clone(), q2.clone()], SearchMode::Exact).unwrap();

        assert!(!results.contains_key(&q1));
        assert_eq!(results[&q2].len(), 1);
        assert_eq!(results[&q2][0].record.id, 12);
    }

    #[test]
    fn test_last_row_still_answers_later_queries() {
        let mut store = RecordStore::new();
        put_variant(&mut store, 1, interval("7", 100, 500));
        let index = CoordinateIndex::build(&store);

        let q1 = CoordinateQuery::new("7", 100, 150);
        let q2 = CoordinateQuery::new("7", 200, 250);
        let results = bulk_search(&index, &[q1.clone(), q2.clone()], SearchMode::Any).unwrap();
        assert_eq!(results[&q1].len(), 1);
        assert_eq!(results[&q2].len(), 1);
    }

    #[test]
    fn test_chromosome_ordering_drives_cursors() {
        let index = fixture();
        let q_chr12 = CoordinateQuery::new("12", 25_398_284, 25_398_284);
        let q_chr7 = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T");
        // "12" sorts before "7" as strings, matching the index layout
        let results =
            bulk_search(&index, &[q_chr12.clone(), q_chr7.clone()], SearchMode::Any).unwrap();
        assert_eq!(results[&q_chr12][0].record.id, 20);
        assert!(results[&q_chr7].iter().any(|r| r.record.id == 12));
    }

    #[test]
    fn test_keyed_queries_stay_distinct() {
        let index = fixture();
        let q1 = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_key("sample-a");
        let q2 = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_key("sample-b");
        let results = bulk_search(&index, &[q1.clone(), q2.clone()], SearchMode::Any).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[&q1].len(), results[&q2].len());
    }

    #[test]
    fn test_off_build_exact_in_bulk() {
        let index = fixture();
        let q38 = CoordinateQuery::new("7", 140_753_336, 140_753_336)
            .with_alt("T")
            .with_build(ReferenceBuild::Grch38);
        let results = bulk_search(&index, &[q38.clone()], SearchMode::Exact).unwrap();
        assert_eq!(results[&q38].len(), 1);
        assert_eq!(results[&q38][0].record.id, 12);
    }

    #[test]
    fn test_off_build_any_rejected_in_bulk() {
        let index = fixture();
        let q38 = CoordinateQuery::new("7", 140_753_336, 140_753_336)
            .with_alt("T")
            .with_build(ReferenceBuild::Grch38);
        let err = bulk_search(&index, &[q38], SearchMode::Any).unwrap_err();
        assert!(matches!(err, QueryError::ModeOffDefaultBuild { .. }));
    }

    #[test]
    fn test_ambiguous_dash_rejected_in_bulk() {
        let index = fixture();
        let q = CoordinateQuery::new("7", 140_453_136, 140_453_136)
            .with_alt("-")
            .with_ref("A");
        let err = bulk_search(&index, &[q], SearchMode::Exact).unwrap_err();
        assert!(matches!(err, QueryError::AmbiguousDash { .. }));
    }
}
