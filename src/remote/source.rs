use thiserror::Error;

use crate::core::types::{RecordId, RecordKind};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("no {kind} record with id {id} exists in the remote knowledgebase")]
    NotFound { kind: RecordKind, id: u32 },

    #[error("transport error talking to the knowledgebase: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode {id}: {reason}")]
    Decode { id: RecordId, reason: String },

    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: RecordKind, reason: String },

    #[error("{kind} records only support fetch-all, not fetch by id list")]
    Unsupported { kind: RecordKind },
}

/// Result of a "fetch all" call: one page stream of payloads plus the full
/// set of matching identities
#[derive(Debug, Clone, Default)]
pub struct FetchAll {
    pub records: Vec<serde_json::Value>,
    pub all_ids: Vec<u32>,
}

/// Where records come from.
///
/// The store and resolver only ever see this trait; the production
/// implementation is [`HttpSource`](crate::remote::HttpSource) and tests
/// substitute [`MemorySource`](crate::remote::MemorySource). A failed
/// fetch is a hard failure here, never retried: retry policy belongs to
/// the caller, and the underlying transport timeout passes through.
pub trait RecordSource {
    /// Fetch one record payload by id
    fn fetch_by_id(&self, kind: RecordKind, id: u32) -> Result<serde_json::Value, RemoteError>;

    /// Fetch a batch of record payloads by id list.
    ///
    /// Kinds that only support "fetch all" return
    /// [`RemoteError::Unsupported`].
    fn fetch_by_ids(
        &self,
        kind: RecordKind,
        ids: &[u32],
    ) -> Result<Vec<serde_json::Value>, RemoteError>;

    /// Fetch every record of a kind
    fn fetch_all(&self, kind: RecordKind) -> Result<FetchAll, RemoteError>;
}
