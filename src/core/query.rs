use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{ReferenceBuild, SearchMode};

/// Explicit "match any non-empty value" sentinel for allele columns
pub const WILDCARD: &str = "*";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("search mode '{mode}' is not supported on build {build}; only 'exact' is available off GRCh37")]
    ModeOffDefaultBuild { build: ReferenceBuild, mode: SearchMode },

    #[error("allele wildcard '*' is not allowed on build {build}")]
    WildcardOffDefaultBuild { build: ReferenceBuild },

    #[error("queries on build {build} must supply at least one of alt/ref")]
    MissingAlleles { build: ReferenceBuild },

    #[error("ambiguous '-' for {column} at {chromosome}:{start}-{stop}; use an absent value instead")]
    AmbiguousDash {
        column: &'static str,
        chromosome: String,
        start: u64,
        stop: u64,
    },

    #[error("bulk queries must be sorted by (chromosome, start, stop); query at position {position} is out of order")]
    UnsortedBulkQueries { position: usize },
}

/// A genomic interval plus optional alleles and build.
///
/// Immutable value type; hashable and comparable so that bulk search can
/// key its results by query. [`CoordinateQuery::position`] gives the
/// (chromosome, start, stop) triple bulk search sorts by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinateQuery {
    pub chromosome: String,
    pub start: u64,
    pub stop: u64,

    /// Variant allele; absent means "wildcard on this column only"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Reference allele; absent means "wildcard on this column only"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_bases: Option<String>,

    #[serde(default)]
    pub build: ReferenceBuild,

    /// Opaque caller tag, carried through bulk results untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CoordinateQuery {
    pub fn new(chromosome: impl Into<String>, start: u64, stop: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            stop,
            alt: None,
            ref_bases: None,
            build: ReferenceBuild::default(),
            key: None,
        }
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    #[must_use]
    pub fn with_ref(mut self, ref_bases: impl Into<String>) -> Self {
        self.ref_bases = Some(ref_bases.into());
        self
    }

    #[must_use]
    pub fn with_build(mut self, build: ReferenceBuild) -> Self {
        self.build = build;
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The sort position used by bulk search
    #[must_use]
    pub fn position(&self) -> (&str, u64, u64) {
        (self.chromosome.as_str(), self.start, self.stop)
    }

    /// Validate this query for the given mode.
    ///
    /// Failures are reported immediately at call time and never coerced:
    /// off the default build only exact matching is available, the `*`
    /// wildcard is disallowed there, and at least one allele is required.
    /// A literal `-` is rejected everywhere as ambiguous with "absent".
    pub fn validate(&self, mode: SearchMode) -> Result<(), QueryError> {
        for (column, value) in [("alt", &self.alt), ("ref", &self.ref_bases)] {
            if value.as_deref() == Some("-") {
                return Err(QueryError::AmbiguousDash {
                    column,
                    chromosome: self.chromosome.clone(),
                    start: self.start,
                    stop: self.stop,
                });
            }
        }

        if !self.build.is_default() {
            if mode != SearchMode::Exact {
                return Err(QueryError::ModeOffDefaultBuild {
                    build: self.build,
                    mode,
                });
            }
            if self.alt.as_deref() == Some(WILDCARD) || self.ref_bases.as_deref() == Some(WILDCARD)
            {
                return Err(QueryError::WildcardOffDefaultBuild { build: self.build });
            }
            if self.alt.is_none() && self.ref_bases.is_none() {
                return Err(QueryError::MissingAlleles { build: self.build });
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for CoordinateQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.stop)?;
        if let Some(alt) = &self.alt {
            write!(f, " alt={alt}")?;
        }
        if let Some(ref_bases) = &self.ref_bases {
            write!(f, " ref={ref_bases}")?;
        }
        if !self.build.is_default() {
            write!(f, " ({})", self.build)?;
        }
        Ok(())
    }
}
