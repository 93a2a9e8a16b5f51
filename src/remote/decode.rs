//! Decoding of remote JSON payloads into complete [`Record`]s.
//!
//! A decoded record is always complete: every field is `Known`, with empty
//! collections standing in for values the payload omits. Nested relations
//! decode to identities only; the referenced records attach to the store as
//! partial stubs and are resolved on their own first access.

use serde_json::Value;

use crate::core::attribute::AttributeValue;
use crate::core::record::{
    AssertionData, Coordinates, EvidenceData, Field, GeneData, Record, RecordData, SourceData,
    VariantData,
};
use crate::core::types::{EvidenceStatus, RecordId, RecordKind};
use crate::remote::source::RemoteError;

/// A decoded record plus the identities it references
#[derive(Debug, Clone)]
pub struct Decoded {
    pub record: Record,
    /// Referenced identities to register as stubs when absent from the store
    pub references: Vec<RecordId>,
}

/// Decode one payload of the given kind
pub fn decode(kind: RecordKind, payload: &Value) -> Result<Decoded, RemoteError> {
    let id = payload
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| RemoteError::MalformedPayload {
            kind,
            reason: "missing or non-integer 'id'".to_string(),
        })?;
    let record_id = RecordId::new(kind, id);

    let mut references = Vec::new();
    let data = match kind {
        RecordKind::Gene => decode_gene(payload, &mut references),
        RecordKind::Variant => decode_variant(payload, &mut references),
        RecordKind::Evidence => decode_evidence(record_id, payload, &mut references)?,
        RecordKind::Assertion => decode_assertion(record_id, payload, &mut references)?,
        RecordKind::Source => decode_source(payload),
    };

    Ok(Decoded {
        record: Record::complete(record_id, data),
        references,
    })
}

fn decode_gene(payload: &Value, references: &mut Vec<RecordId>) -> RecordData {
    let mut data = GeneData::default();
    data.name = Field::Known(str_field(payload, "name"));
    data.description = Field::Known(str_field(payload, "description"));
    data.aliases = Field::Known(str_list(payload, "aliases"));
    let variants = id_list(payload, "variants", RecordKind::Variant);
    references.extend(variants.iter().copied());
    data.variants = Field::Known(variants);
    RecordData::Gene(data)
}

fn decode_variant(payload: &Value, references: &mut Vec<RecordId>) -> RecordData {
    let mut data = VariantData::default();
    data.name = Field::Known(str_field(payload, "name"));
    data.description = Field::Known(str_field(payload, "description"));
    data.aliases = Field::Known(str_list(payload, "variant_aliases"));
    data.coordinates = Field::Known(decode_coordinates(payload.get("coordinates")));
    data.variant_types = Field::Known(
        payload
            .get("variant_types")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        item.as_str()
                            .map(String::from)
                            .or_else(|| item.get("name").and_then(Value::as_str).map(String::from))
                    })
                    .collect()
            })
            .unwrap_or_default(),
    );

    let gene = payload
        .get("gene_id")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .map(|gid| RecordId::new(RecordKind::Gene, gid));
    if let Some(gene) = gene {
        references.push(gene);
        data.gene = Field::Known(gene);
    }

    let evidence = id_list(payload, "evidence_items", RecordKind::Evidence);
    references.extend(evidence.iter().copied());
    data.evidence = Field::Known(evidence);

    let assertions = id_list(payload, "assertions", RecordKind::Assertion);
    references.extend(assertions.iter().copied());
    data.assertions = Field::Known(assertions);

    RecordData::Variant(data)
}

fn decode_evidence(
    id: RecordId,
    payload: &Value,
    references: &mut Vec<RecordId>,
) -> Result<RecordData, RemoteError> {
    let mut data = EvidenceData::default();
    data.name = Field::Known(str_field(payload, "name"));
    data.description = Field::Known(str_field(payload, "description"));
    data.status = Field::Known(decode_status(id, payload)?);
    data.rating = Field::Known(
        payload
            .get("rating")
            .and_then(Value::as_u64)
            .and_then(|v| u8::try_from(v).ok()),
    );
    data.drugs = Field::Known(attribute_list(payload, "drugs", "drug"));
    data.disease = Field::Known(attribute(payload.get("disease"), "disease"));

    if let Some(variant) = referenced_id(payload, "variant_id", RecordKind::Variant) {
        references.push(variant);
        data.variant = Field::Known(variant);
    }
    let source = referenced_id(payload, "source_id", RecordKind::Source);
    if let Some(source) = source {
        references.push(source);
    }
    data.source = Field::Known(source);

    Ok(RecordData::Evidence(data))
}

fn decode_assertion(
    id: RecordId,
    payload: &Value,
    references: &mut Vec<RecordId>,
) -> Result<RecordData, RemoteError> {
    let mut data = AssertionData::default();
    data.name = Field::Known(str_field(payload, "name"));
    data.description = Field::Known(str_field(payload, "description"));
    data.summary = Field::Known(str_field(payload, "summary"));
    data.status = Field::Known(decode_status(id, payload)?);
    data.drugs = Field::Known(attribute_list(payload, "drugs", "drug"));
    data.disease = Field::Known(attribute(payload.get("disease"), "disease"));

    if let Some(variant) = referenced_id(payload, "variant_id", RecordKind::Variant) {
        references.push(variant);
        data.variant = Field::Known(variant);
    }
    if let Some(gene) = referenced_id(payload, "gene_id", RecordKind::Gene) {
        references.push(gene);
        data.gene = Field::Known(gene);
    }

    Ok(RecordData::Assertion(data))
}

fn decode_source(payload: &Value) -> RecordData {
    let mut data = SourceData::default();
    data.citation = Field::Known(str_field(payload, "citation"));
    data.name = Field::Known(str_field(payload, "name"));
    RecordData::Source(data)
}

fn decode_coordinates(value: Option<&Value>) -> Coordinates {
    let Some(value) = value else {
        return Coordinates::default();
    };
    Coordinates {
        chromosome: opt_str(value, "chromosome"),
        start: opt_u64(value, "start"),
        stop: opt_u64(value, "stop"),
        alt: opt_str(value, "variant_bases"),
        ref_bases: opt_str(value, "reference_bases"),
        chromosome2: opt_str(value, "chromosome2"),
        start2: opt_u64(value, "start2"),
        stop2: opt_u64(value, "stop2"),
    }
}

fn decode_status(id: RecordId, payload: &Value) -> Result<EvidenceStatus, RemoteError> {
    let raw = payload
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| RemoteError::Decode {
            id,
            reason: "missing 'status'".to_string(),
        })?;
    EvidenceStatus::parse(raw).ok_or_else(|| RemoteError::Decode {
        id,
        reason: format!("unknown status '{raw}'"),
    })
}

fn attribute(value: Option<&Value>, category: &str) -> Option<AttributeValue> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let name = value.get("name").and_then(Value::as_str)?;
    let mut attr = AttributeValue::new(category, name);
    attr.id = value
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok());
    attr.external_id = value
        .get("external_id")
        .and_then(Value::as_str)
        .map(String::from);
    Some(attr)
}

fn attribute_list(payload: &Value, key: &str, category: &str) -> Vec<AttributeValue> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| attribute(Some(item), category))
                .collect()
        })
        .unwrap_or_default()
}

fn referenced_id(payload: &Value, key: &str, kind: RecordKind) -> Option<RecordId> {
    payload
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .map(|id| RecordId::new(kind, id))
}

/// Relation arrays arrive either as bare ids or as objects carrying an id
fn id_list(payload: &Value, key: &str, kind: RecordKind) -> Vec<RecordId> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item.as_u64()
                        .or_else(|| item.get("id").and_then(Value::as_u64))
                        .and_then(|v| u32::try_from(v).ok())
                })
                .map(|id| RecordId::new(kind, id))
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn opt_u64(payload: &Value, key: &str) -> Option<u64> {
    payload.get(key).and_then(Value::as_u64)
}

fn str_list(payload: &Value, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_variant_with_relations() {
        let payload = json!({
            "id": 12,
            "name": "V600E",
            "description": "BRAF V600E",
            "gene_id": 5,
            "coordinates": {
                "chromosome": "7",
                "start": 140_453_136u64,
                "stop": 140_453_136u64,
                "variant_bases": "T",
                "reference_bases": "A"
            },
            "variant_types": [{"name": "missense_variant"}],
            "evidence_items": [{"id": 100}, {"id": 101}],
            "assertions": [7]
        });

        let decoded = decode(RecordKind::Variant, &payload).unwrap();
        assert!(!decoded.record.is_partial());
        let data = decoded.record.data.as_variant().unwrap();
        assert_eq!(data.name.known(), Some(&"V600E".to_string()));
        let coords = data.coordinates.known().unwrap();
        assert_eq!(coords.primary(), Some(("7", 140_453_136, 140_453_136)));
        assert_eq!(coords.alt.as_deref(), Some("T"));

        assert!(decoded
            .references
            .contains(&RecordId::new(RecordKind::Gene, 5)));
        assert!(decoded
            .references
            .contains(&RecordId::new(RecordKind::Evidence, 101)));
        assert!(decoded
            .references
            .contains(&RecordId::new(RecordKind::Assertion, 7)));
    }

    #[test]
    fn test_decode_evidence_status_required() {
        let payload = json!({"id": 100, "name": "EID100"});
        let err = decode(RecordKind::Evidence, &payload).unwrap_err();
        assert!(err.to_string().contains("evidence:100"));
    }

    #[test]
    fn test_decode_evidence_attributes() {
        let payload = json!({
            "id": 100,
            "status": "accepted",
            "rating": 4,
            "drugs": [{"id": 19, "name": "Vemurafenib"}],
            "disease": {"id": 206, "name": "Melanoma", "external_id": "DOID:1909"},
            "variant_id": 12,
            "source_id": 48
        });
        let decoded = decode(RecordKind::Evidence, &payload).unwrap();
        let data = decoded.record.data.as_evidence().unwrap();
        assert_eq!(data.status.known(), Some(&EvidenceStatus::Accepted));
        assert_eq!(data.rating.known(), Some(&Some(4)));
        let drugs = data.drugs.known().unwrap();
        assert_eq!(drugs[0].dedup_key(), Some(("drug".to_string(), 19)));
        assert_eq!(
            data.disease.known().unwrap().as_ref().unwrap().external_id.as_deref(),
            Some("DOID:1909")
        );
    }

    #[test]
    fn test_decode_missing_id_is_malformed() {
        let payload = json!({"name": "no id here"});
        let err = decode(RecordKind::Gene, &payload).unwrap_err();
        assert!(matches!(err, RemoteError::MalformedPayload { .. }));
    }
}
