//! Integration tests for coordinate search: the bulk sweep must agree
//! with the single-query path for every query in a sorted batch, and the
//! two paths must reject invalid queries identically.

use std::collections::HashSet;

use chrono::{Duration, Utc};

use varkb::cache::CacheSnapshot;
use varkb::core::record::{Coordinates, Field, RecordData, VariantData};
use varkb::core::types::ReferenceBuild;
use varkb::core::QueryError;
use varkb::{
    bulk_search, search_by_coordinates, Cache, CacheConfig, CoordinateIndex, CoordinateQuery,
    LoadOutcome, OnStale, Record, RecordId, RecordKind, RecordStore, SearchMode,
};

fn put_variant(store: &mut RecordStore, id: u32, coords: Coordinates) {
    let mut data = VariantData::default();
    data.name = Field::Known(format!("variant-{id}"));
    data.coordinates = Field::Known(coords);
    store.put(Record::complete(
        RecordId::new(RecordKind::Variant, id),
        RecordData::Variant(data),
    ));
}

fn snv(chrom: &str, pos: u64, alt: &str, ref_bases: &str) -> Coordinates {
    Coordinates {
        chromosome: Some(chrom.to_string()),
        start: Some(pos),
        stop: Some(pos),
        alt: Some(alt.to_string()),
        ref_bases: Some(ref_bases.to_string()),
        ..Default::default()
    }
}

fn span(chrom: &str, start: u64, stop: u64) -> Coordinates {
    Coordinates {
        chromosome: Some(chrom.to_string()),
        start: Some(start),
        stop: Some(stop),
        ..Default::default()
    }
}

/// A store with overlapping, adjacent, and allele-varied variants on
/// three chromosomes, including a fusion-style variant whose second
/// locus contributes an alleleless index row.
fn fixture() -> (RecordStore, CoordinateIndex) {
    let mut store = RecordStore::new();
    // BRAF V600E hotspot and a same-position allele sibling
    put_variant(&mut store, 12, snv("7", 140_453_136, "T", "A"));
    put_variant(&mut store, 15, snv("7", 140_453_136, "G", "A"));
    // Neighbor one base away
    put_variant(&mut store, 13, snv("7", 140_453_137, "C", "G"));
    // A deletion spanning the hotspot and its neighbor
    put_variant(&mut store, 14, span("7", 140_453_100, 140_453_200));
    // KRAS G12
    put_variant(&mut store, 20, snv("12", 25_398_284, "T", "C"));
    // A fusion with a second locus on chromosome 2
    put_variant(
        &mut store,
        30,
        Coordinates {
            chromosome: Some("7".to_string()),
            start: Some(55_259_515),
            stop: Some(55_259_515),
            alt: Some("G".to_string()),
            ref_bases: Some("T".to_string()),
            chromosome2: Some("2".to_string()),
            start2: Some(42_522_656),
            stop2: Some(42_522_656),
            ..Default::default()
        },
    );
    let index = CoordinateIndex::build(&store);
    (store, index)
}

fn single_ids(
    store: &RecordStore,
    index: &CoordinateIndex,
    query: &CoordinateQuery,
    mode: SearchMode,
) -> HashSet<RecordId> {
    search_by_coordinates(store, index, query, mode)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect()
}

/// Assert that a sorted batch produces identical per-query record sets
/// through both paths, in every mode.
fn assert_equivalent(store: &RecordStore, index: &CoordinateIndex, queries: &[CoordinateQuery]) {
    for mode in [
        SearchMode::Any,
        SearchMode::QueryEncompassing,
        SearchMode::RecordEncompassing,
        SearchMode::Exact,
    ] {
        let bulk = bulk_search(index, queries, mode).unwrap();
        for query in queries {
            let expected = single_ids(store, index, query, mode);
            let got: HashSet<RecordId> = bulk
                .get(query)
                .map(|rows| rows.iter().map(|row| row.record).collect())
                .unwrap_or_default();
            assert_eq!(
                got, expected,
                "mode {mode:?} disagrees on query {query}"
            );
        }
    }
}

#[test]
fn test_bulk_agrees_with_single_across_modes() {
    let (store, index) = fixture();
    let queries = vec![
        CoordinateQuery::new("12", 25_398_284, 25_398_284),
        CoordinateQuery::new("2", 42_522_656, 42_522_656),
        CoordinateQuery::new("7", 55_259_515, 55_259_515).with_alt("G"),
        CoordinateQuery::new("7", 140_453_100, 140_453_140),
        CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T"),
        CoordinateQuery::new("7", 140_453_136, 140_453_137).with_alt("*"),
        CoordinateQuery::new("7", 140_453_137, 140_453_137),
    ];
    assert_equivalent(&store, &index, &queries);
}

#[test]
fn test_adjacent_queries_revisit_shared_rows() {
    let (store, index) = fixture();
    // Both queries overlap the spanning deletion; the second must still
    // see rows the first already consumed.
    let queries = vec![
        CoordinateQuery::new("7", 140_453_110, 140_453_120),
        CoordinateQuery::new("7", 140_453_130, 140_453_150),
    ];
    assert_equivalent(&store, &index, &queries);

    let bulk = bulk_search(&index, &queries, SearchMode::Any).unwrap();
    for query in &queries {
        let ids: HashSet<RecordId> = bulk[query].iter().map(|row| row.record).collect();
        assert!(ids.contains(&RecordId::new(RecordKind::Variant, 14)));
    }
}

#[test]
fn test_bookmark_survives_nonmatching_overlaps() {
    let (store, index) = fixture();
    // In exact mode the first query overlaps the hotspot rows but its
    // alt matches neither; the second query does match one of them. The
    // row cursor must rewind to the start of the shared window.
    let queries = vec![
        CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("C"),
        CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T"),
    ];
    assert_equivalent(&store, &index, &queries);

    let bulk = bulk_search(&index, &queries, SearchMode::Exact).unwrap();
    assert!(!bulk.contains_key(&queries[0]));
    let ids: HashSet<RecordId> = bulk[&queries[1]].iter().map(|row| row.record).collect();
    assert_eq!(ids, HashSet::from([RecordId::new(RecordKind::Variant, 12)]));
}

#[test]
fn test_exact_braf_with_wildcard_ref() {
    let (store, index) = fixture();
    let q = CoordinateQuery::new("7", 140_453_136, 140_453_136)
        .with_alt("T")
        .with_ref("*");
    let hits = search_by_coordinates(&store, &index, &q, SearchMode::Exact).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, RecordId::new(RecordKind::Variant, 12));

    let bulk = bulk_search(&index, std::slice::from_ref(&q), SearchMode::Exact).unwrap();
    assert_eq!(bulk[&q].len(), 1);
    assert_eq!(bulk[&q][0].record, RecordId::new(RecordKind::Variant, 12));
}

#[test]
fn test_queries_without_matches_are_absent_from_bulk_map() {
    let (store, index) = fixture();
    let miss = CoordinateQuery::new("1", 1000, 2000);
    let hit = CoordinateQuery::new("12", 25_398_284, 25_398_284);
    let queries = vec![miss.clone(), hit.clone()];
    assert_equivalent(&store, &index, &queries);

    let bulk = bulk_search(&index, &queries, SearchMode::Any).unwrap();
    assert!(!bulk.contains_key(&miss));
    assert!(bulk.contains_key(&hit));
}

#[test]
fn test_dash_allele_rejected_by_both_paths() {
    let (store, index) = fixture();
    let q = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("-");

    let err = search_by_coordinates(&store, &index, &q, SearchMode::Any).unwrap_err();
    assert!(matches!(err, QueryError::AmbiguousDash { column: "alt", .. }));

    let err = bulk_search(&index, std::slice::from_ref(&q), SearchMode::Any).unwrap_err();
    assert!(matches!(err, QueryError::AmbiguousDash { column: "alt", .. }));
}

#[test]
fn test_off_default_build_restrictions() {
    let (store, index) = fixture();

    let q = CoordinateQuery::new("7", 140_753_336, 140_753_336)
        .with_alt("T")
        .with_build(ReferenceBuild::Grch38);
    let err = search_by_coordinates(&store, &index, &q, SearchMode::Any).unwrap_err();
    assert!(matches!(err, QueryError::ModeOffDefaultBuild { .. }));

    let q = CoordinateQuery::new("7", 140_753_336, 140_753_336)
        .with_alt("*")
        .with_build(ReferenceBuild::Grch38);
    let err = search_by_coordinates(&store, &index, &q, SearchMode::Exact).unwrap_err();
    assert!(matches!(err, QueryError::WildcardOffDefaultBuild { .. }));

    let q = CoordinateQuery::new("7", 140_753_336, 140_753_336).with_build(ReferenceBuild::Grch38);
    let err = search_by_coordinates(&store, &index, &q, SearchMode::Exact).unwrap_err();
    assert!(matches!(err, QueryError::MissingAlleles { .. }));
}

#[test]
fn test_off_build_query_translates_in_both_paths() {
    let (store, index) = fixture();
    let grch38 = CoordinateQuery::new("7", 140_753_336, 140_753_336)
        .with_alt("T")
        .with_build(ReferenceBuild::Grch38);

    let hits = search_by_coordinates(&store, &index, &grch38, SearchMode::Exact).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, RecordId::new(RecordKind::Variant, 12));

    // Mixed batch: the off-build query sits between default-build ones
    // and is keyed by its original coordinates in the result map.
    let queries = vec![
        CoordinateQuery::new("7", 140_453_137, 140_453_137),
        grch38.clone(),
    ];
    let bulk = bulk_search(&index, &queries, SearchMode::Exact).unwrap();
    let ids: HashSet<RecordId> = bulk[&grch38].iter().map(|row| row.record).collect();
    assert_eq!(ids, HashSet::from([RecordId::new(RecordKind::Variant, 12)]));
}

#[test]
fn test_untranslatable_off_build_locus_is_empty_not_error() {
    let (store, index) = fixture();
    let q = CoordinateQuery::new("3", 10_000, 10_000)
        .with_alt("T")
        .with_build(ReferenceBuild::Ncbi36);
    let hits = search_by_coordinates(&store, &index, &q, SearchMode::Exact).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn test_unsorted_bulk_batch_rejected() {
    let (_, index) = fixture();
    let queries = vec![
        CoordinateQuery::new("7", 140_453_137, 140_453_137),
        CoordinateQuery::new("7", 140_453_136, 140_453_136),
    ];
    let err = bulk_search(&index, &queries, SearchMode::Any).unwrap_err();
    assert!(matches!(err, QueryError::UnsortedBulkQueries { position: 1 }));
}

#[test]
fn test_stale_snapshot_usable_under_ignore_policy() {
    let (store, _) = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.bin.gz");

    let stamped = Utc::now() - Duration::days(30);
    let snapshot = CacheSnapshot::capture(&store, Some(stamped));
    snapshot.save(&path).unwrap();

    let config = CacheConfig::new(&path, "http://unused.invalid/snapshot.bin.gz");
    let mut cache = Cache::new(config);
    let outcome = cache.load_passive(&path, OnStale::Ignore).unwrap();
    assert_eq!(outcome, LoadOutcome::LoadedStale);
    assert!(!cache.status().fresh);

    // The stale store still answers searches without touching a remote.
    let q = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T");
    let hits = search_by_coordinates(cache.store(), cache.index(), &q, SearchMode::Exact).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, RecordId::new(RecordKind::Variant, 12));
}

#[test]
fn test_stale_snapshot_rejected_leaves_store_untouched() {
    let (store, _) = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("downloaded.bin.gz");

    let snapshot = CacheSnapshot::capture(&store, Some(Utc::now() - Duration::days(30)));
    snapshot.save(&path).unwrap();

    let config = CacheConfig::new(dir.path().join("canonical.bin.gz"), "http://unused.invalid/s");
    let mut cache = Cache::new(config);
    let outcome = cache.load_passive(&path, OnStale::Reject).unwrap();
    assert_eq!(outcome, LoadOutcome::Rejected);
    assert!(cache.store().is_empty());
}

#[test]
fn test_bulk_duplicate_queries_each_get_results() {
    let (store, index) = fixture();
    let q = CoordinateQuery::new("7", 140_453_136, 140_453_136);
    let queries = vec![q.clone(), q.clone()];
    assert_equivalent(&store, &index, &queries);

    let bulk = bulk_search(&index, &queries, SearchMode::Any).unwrap();
    // Identical queries collapse to one map entry with one result set.
    assert_eq!(bulk.len(), 1);
    let ids: HashSet<RecordId> = bulk[&q].iter().map(|row| row.record).collect();
    assert_eq!(ids, single_ids(&store, &index, &q, SearchMode::Any));
}

#[test]
fn test_bulk_results_carry_row_coordinates() {
    let (_, index) = fixture();
    let q = CoordinateQuery::new("2", 42_522_656, 42_522_656);
    let bulk = bulk_search(&index, std::slice::from_ref(&q), SearchMode::Any).unwrap();
    let rows = &bulk[&q];
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].chromosome, "2");
    assert_eq!(rows[0].record, RecordId::new(RecordKind::Variant, 30));
    // Second-locus rows carry no alleles.
    assert!(rows[0].alt.is_none());
    assert!(rows[0].ref_bases.is_none());
}
