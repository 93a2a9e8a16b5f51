//! Fixed coordinate translations for queries expressed off the default
//! build. Translation is delegated to this constant set; it is never
//! computed, and loci absent from the table simply do not resolve.

use tracing::debug;

use crate::core::query::CoordinateQuery;
use crate::core::types::ReferenceBuild;

/// One known locus expressed in a non-default build, with its GRCh37
/// equivalent
#[derive(Debug, Clone, Copy)]
pub struct LiftedLocus {
    pub build: ReferenceBuild,
    pub chromosome: &'static str,
    pub start: u64,
    pub stop: u64,
    pub grch37_start: u64,
    pub grch37_stop: u64,
}

/// Well-known hotspot loci in GRCh38 and NCBI36 coordinates
pub const LIFTED_LOCI: &[LiftedLocus] = &[
    // BRAF V600E
    LiftedLocus {
        build: ReferenceBuild::Grch38,
        chromosome: "7",
        start: 140_753_336,
        stop: 140_753_336,
        grch37_start: 140_453_136,
        grch37_stop: 140_453_136,
    },
    LiftedLocus {
        build: ReferenceBuild::Ncbi36,
        chromosome: "7",
        start: 140_099_605,
        stop: 140_099_605,
        grch37_start: 140_453_136,
        grch37_stop: 140_453_136,
    },
    // EGFR L858R
    LiftedLocus {
        build: ReferenceBuild::Grch38,
        chromosome: "7",
        start: 55_191_822,
        stop: 55_191_822,
        grch37_start: 55_259_515,
        grch37_stop: 55_259_515,
    },
    LiftedLocus {
        build: ReferenceBuild::Ncbi36,
        chromosome: "7",
        start: 55_227_022,
        stop: 55_227_022,
        grch37_start: 55_259_515,
        grch37_stop: 55_259_515,
    },
    // KRAS G12 codon
    LiftedLocus {
        build: ReferenceBuild::Grch38,
        chromosome: "12",
        start: 25_245_350,
        stop: 25_245_350,
        grch37_start: 25_398_284,
        grch37_stop: 25_398_284,
    },
    LiftedLocus {
        build: ReferenceBuild::Ncbi36,
        chromosome: "12",
        start: 25_289_551,
        stop: 25_289_551,
        grch37_start: 25_398_284,
        grch37_stop: 25_398_284,
    },
];

/// Translate a non-default-build query into default-build coordinates,
/// preserving alleles, build-independent columns, and the caller key.
/// Returns `None` when the locus is not in the constant set.
#[must_use]
pub fn translate(query: &CoordinateQuery) -> Option<CoordinateQuery> {
    if query.build.is_default() {
        return Some(query.clone());
    }
    let locus = LIFTED_LOCI.iter().find(|l| {
        l.build == query.build
            && l.chromosome == query.chromosome
            && l.start == query.start
            && l.stop == query.stop
    });
    match locus {
        Some(locus) => {
            let mut translated = query.clone();
            translated.start = locus.grch37_start;
            translated.stop = locus.grch37_stop;
            translated.build = ReferenceBuild::Grch37;
            Some(translated)
        }
        None => {
            debug!(query = %query, "no fixed translation for locus");
            None
        }
    }
}
