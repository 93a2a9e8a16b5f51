//! Record cache: identity-keyed store, lazy resolver, snapshot
//! persistence, and the freshness state machine that reconciles a
//! persisted snapshot against live data.

pub mod freshness;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use freshness::{Cache, CacheConfig, CacheError, CacheStatus, LoadOutcome, OnStale};
pub use resolver::Resolver;
pub use snapshot::{CacheSnapshot, SnapshotError, SNAPSHOT_VERSION};
pub use store::RecordStore;
