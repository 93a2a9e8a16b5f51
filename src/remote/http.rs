use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::RecordKind;
use crate::remote::source::{FetchAll, RecordSource, RemoteError};

/// Default public endpoint of the knowledgebase API
pub const DEFAULT_API_URL: &str = "https://knowledgebase.example.org/api";

/// Records requested per search page
const PAGE_SIZE: usize = 500;

/// One field predicate inside a search envelope
#[derive(Debug, Serialize)]
struct FieldQuery {
    field: &'static str,
    condition: Condition,
}

#[derive(Debug, Serialize)]
struct Condition {
    name: &'static str,
    parameters: Vec<serde_json::Value>,
}

/// OR-combined query envelope accepted by the search endpoint
#[derive(Debug, Serialize)]
struct QueryEnvelope {
    operator: &'static str,
    queries: Vec<FieldQuery>,
    limit: usize,
    page: usize,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    records: Vec<serde_json::Value>,
    #[serde(default)]
    total: usize,
    /// Full matching-id set, populated when "all" was requested
    #[serde(default)]
    matched_ids: Vec<u32>,
}

/// Blocking HTTP source backed by the live knowledgebase API
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    /// Connect to the given API base URL.
    ///
    /// The request timeout surfaces to callers as a transport error; there
    /// is no retry or backoff layer here.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("varkb/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn search(&self, kind: RecordKind, envelope: &QueryEnvelope) -> Result<SearchPage, RemoteError> {
        let url = format!("{}/{}/search", self.base_url, kind.api_path());
        let response = self.client.post(&url).json(envelope).send()?;
        let page: SearchPage = response.error_for_status()?.json()?;
        Ok(page)
    }

    /// Page through the search endpoint until `total` records arrived
    fn search_paged(
        &self,
        kind: RecordKind,
        queries: impl Fn() -> Vec<FieldQuery>,
    ) -> Result<FetchAll, RemoteError> {
        let mut result = FetchAll::default();
        let mut page = 1;
        loop {
            let envelope = QueryEnvelope {
                operator: "OR",
                queries: queries(),
                limit: PAGE_SIZE,
                page,
            };
            let got = self.search(kind, &envelope)?;
            let received = got.records.len();
            result.records.extend(got.records);
            if page == 1 {
                result.all_ids = got.matched_ids;
            }
            debug!(
                kind = %kind,
                page,
                received,
                total = got.total,
                "search page fetched"
            );
            if received == 0 || result.records.len() >= got.total {
                break;
            }
            page += 1;
        }
        Ok(result)
    }
}

impl RecordSource for HttpSource {
    fn fetch_by_id(&self, kind: RecordKind, id: u32) -> Result<serde_json::Value, RemoteError> {
        let url = format!("{}/{}/{}", self.base_url, kind.api_path(), id);
        debug!(kind = %kind, id, "fetching record by id");
        let response = self.client.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound { kind, id });
        }
        let payload = response.error_for_status()?.json()?;
        Ok(payload)
    }

    fn fetch_by_ids(
        &self,
        kind: RecordKind,
        ids: &[u32],
    ) -> Result<Vec<serde_json::Value>, RemoteError> {
        if !kind.supports_id_list_fetch() {
            return Err(RemoteError::Unsupported { kind });
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = self.search_paged(kind, || {
            ids.iter()
                .map(|id| FieldQuery {
                    field: "id",
                    condition: Condition {
                        name: "is_equal_to",
                        parameters: vec![serde_json::json!(id)],
                    },
                })
                .collect()
        })?;
        Ok(result.records)
    }

    fn fetch_all(&self, kind: RecordKind) -> Result<FetchAll, RemoteError> {
        self.search_paged(kind, || {
            vec![FieldQuery {
                field: "id",
                condition: Condition {
                    name: "is_greater_than",
                    parameters: vec![serde_json::json!(0)],
                },
            }]
        })
    }
}
