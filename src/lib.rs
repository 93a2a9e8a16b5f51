//! # varkb
//!
//! A local cache and coordinate-search layer for a remote genomic-variant
//! knowledgebase.
//!
//! Records (genes, variants, evidence items, assertions, sources) live in
//! an identity-keyed store. A record referenced before it is fetched
//! exists as a partial stub; its first field access resolves it with a
//! single remote round trip, and that round trip happens at most once per
//! identity per process lifetime. A persisted snapshot reconciles against
//! live data through a configurable freshness policy, and the loaded
//! variant set feeds a flat coordinate index that answers interval
//! queries under four matching semantics, either one query at a time or
//! as a sorted batch swept in a single pass.
//!
//! ## Example
//!
//! ```rust,no_run
//! use varkb::cache::{Cache, CacheConfig, OnStale};
//! use varkb::core::{CoordinateQuery, SearchMode};
//! use varkb::remote::HttpSource;
//! use varkb::search::search_by_coordinates;
//!
//! let config = CacheConfig::default();
//! let path = config.local_path.clone();
//! let mut cache = Cache::new(config);
//! let source = HttpSource::new(varkb::remote::DEFAULT_API_URL).unwrap();
//! cache.load(&path, OnStale::Auto, &source).unwrap();
//!
//! // BRAF V600E
//! let query = CoordinateQuery::new("7", 140_453_136, 140_453_136).with_alt("T");
//! let hits = search_by_coordinates(cache.store(), cache.index(), &query, SearchMode::Exact).unwrap();
//! for record in hits {
//!     println!("{}: {}", record.id, record.label());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: record, identity, and query types
//! - [`cache`]: store, lazy resolver, snapshot persistence, freshness policy
//! - [`index`]: the flat coordinate index and its sorted projections
//! - [`search`]: single-query and bulk sweep coordinate search
//! - [`remote`]: the record source trait and the HTTP implementation
//! - [`export`]: read-only VCF and JSON document output
//! - [`cli`]: command-line interface implementation

pub mod cache;
pub mod cli;
pub mod core;
pub mod export;
pub mod index;
pub mod remote;
pub mod search;

// Re-export commonly used types for convenience
pub use cache::{Cache, CacheConfig, LoadOutcome, OnStale, RecordStore, Resolver};
pub use core::{CoordinateQuery, Record, RecordId, RecordKind, SearchMode, StatusFilter};
pub use index::{CoordinateIndex, IndexRow};
pub use search::{bulk_search, search_by_coordinates};
