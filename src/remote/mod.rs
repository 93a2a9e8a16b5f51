//! Remote knowledgebase access.
//!
//! [`RecordSource`] is the seam between the cache and the wire: lookup by
//! id, by id list, and fetch-all over an OR-combined query envelope.
//! [`HttpSource`] is the production implementation; [`MemorySource`] serves
//! canned payloads for tests and offline tooling. [`decode`] turns raw JSON
//! payloads into complete records plus the identities they reference.

pub mod decode;
pub mod http;
pub mod memory;
pub mod source;

pub use decode::{decode, Decoded};
pub use http::{HttpSource, DEFAULT_API_URL};
pub use memory::MemorySource;
pub use source::{FetchAll, RecordSource, RemoteError};
