use serde::{Deserialize, Serialize};

/// A leaf value object attached to evidence or assertions: a drug, a
/// disease, a country of origin, and so on.
///
/// Attribute values are not records. When the remote payload carries an id
/// they deduplicate by ([`AttributeValue::category`], id); without an id
/// they have no stable identity and must never be cached by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Remote id, when the knowledgebase assigns one
    #[serde(default)]
    pub id: Option<u32>,

    /// What this value is (e.g. "drug", "disease", "country")
    pub category: String,

    /// Display name
    pub name: String,

    /// External ontology identifier, when present (e.g. a DOID)
    #[serde(default)]
    pub external_id: Option<String>,
}

impl AttributeValue {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            category: category.into(),
            name: name.into(),
            external_id: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Deduplication key, present only when the value carries an id
    #[must_use]
    pub fn dedup_key(&self) -> Option<(String, u32)> {
        self.id.map(|id| (self.category.clone(), id))
    }
}
