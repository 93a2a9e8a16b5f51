//! Flat coordinate index over the loaded variant set.
//!
//! One row per variant with a complete primary coordinate triple, plus a
//! second allele-less row for variants carrying a secondary pair
//! (rearrangements). Rows are sorted by (chromosome, start, stop, alt,
//! ref) and that ordering is the only ordering the sweep search may
//! assume; the start- and stop-sorted projections exist for the
//! single-query binary searches.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cache::store::RecordStore;
use crate::core::record::Field;
use crate::core::types::{RecordId, RecordKind};

/// One indexed interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub chromosome: String,
    pub start: u64,
    pub stop: u64,
    pub alt: Option<String>,
    pub ref_bases: Option<String>,
    /// Identity of the variant this row belongs to
    pub record: RecordId,
}

impl IndexRow {
    fn sort_key(&self) -> (&str, u64, u64, Option<&str>, Option<&str>) {
        (
            self.chromosome.as_str(),
            self.start,
            self.stop,
            self.alt.as_deref(),
            self.ref_bases.as_deref(),
        )
    }
}

#[derive(Debug, Default)]
pub struct CoordinateIndex {
    rows: Vec<IndexRow>,
    /// Row positions ordered by chromosome
    by_chromosome: Vec<usize>,
    /// Row positions ordered by start
    by_start: Vec<usize>,
    /// Row positions ordered by stop
    by_stop: Vec<usize>,
}

impl CoordinateIndex {
    /// Build the index from every complete variant record in the store.
    ///
    /// Variants with incomplete primary coordinates are skipped silently.
    #[must_use]
    pub fn build(store: &RecordStore) -> Self {
        let mut rows = Vec::new();
        for record in store.complete_of_kind(RecordKind::Variant) {
            let Some(data) = record.data.as_variant() else {
                continue;
            };
            let Field::Known(coords) = &data.coordinates else {
                continue;
            };
            let Some((chrom, start, stop)) = coords.primary() else {
                trace!(id = %record.id, "variant lacks a complete primary triple, not indexed");
                continue;
            };
            rows.push(IndexRow {
                chromosome: chrom.to_string(),
                start,
                stop,
                alt: coords.alt.clone(),
                ref_bases: coords.ref_bases.clone(),
                record: record.id,
            });
            if let Some((chrom2, start2, stop2)) = coords.secondary() {
                rows.push(IndexRow {
                    chromosome: chrom2.to_string(),
                    start: start2,
                    stop: stop2,
                    alt: None,
                    ref_bases: None,
                    record: record.id,
                });
            }
        }

        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut by_chromosome: Vec<usize> = (0..rows.len()).collect();
        by_chromosome.sort_by(|&a, &b| rows[a].chromosome.cmp(&rows[b].chromosome));
        let mut by_start: Vec<usize> = (0..rows.len()).collect();
        by_start.sort_by_key(|&i| rows[i].start);
        let mut by_stop: Vec<usize> = (0..rows.len()).collect();
        by_stop.sort_by_key(|&i| rows[i].stop);

        debug!(rows = rows.len(), "coordinate index built");
        Self {
            rows,
            by_chromosome,
            by_start,
            by_stop,
        }
    }

    /// The full row table, in (chromosome, start, stop, alt, ref) order
    #[must_use]
    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row positions on the given chromosome, via binary search over the
    /// chromosome-sorted projection
    #[must_use]
    pub fn positions_on_chromosome(&self, chromosome: &str) -> &[usize] {
        let lo = self
            .by_chromosome
            .partition_point(|&i| self.rows[i].chromosome.as_str() < chromosome);
        let hi = self
            .by_chromosome
            .partition_point(|&i| self.rows[i].chromosome.as_str() <= chromosome);
        &self.by_chromosome[lo..hi]
    }

    /// Row positions whose start is at or before `pos`, via the
    /// start-sorted projection
    #[must_use]
    pub fn positions_starting_at_or_before(&self, pos: u64) -> &[usize] {
        let hi = self.by_start.partition_point(|&i| self.rows[i].start <= pos);
        &self.by_start[..hi]
    }

    /// Row positions whose stop is at or after `pos`, via the stop-sorted
    /// projection
    #[must_use]
    pub fn positions_stopping_at_or_after(&self, pos: u64) -> &[usize] {
        let lo = self.by_stop.partition_point(|&i| self.rows[i].stop < pos);
        &self.by_stop[lo..]
    }
}
