use serde_json::{json, Value};

use crate::cache::store::RecordStore;
use crate::core::record::{Field, Record, RecordData};
use crate::core::types::{RecordId, StatusFilter};
use crate::export::ExportError;

/// Serialize one record as a structured document, with its
/// status-filtered visible children inlined one level deep.
///
/// Read-only over the store; children beyond the first level stay as
/// identities.
pub fn record_document(
    store: &RecordStore,
    id: &RecordId,
    filter: &StatusFilter,
) -> Result<Value, ExportError> {
    let record = store.get(id).ok_or(ExportError::UnknownRecord(*id))?;

    let mut doc = shallow(record);
    match &record.data {
        RecordData::Variant(_) => {
            doc["evidence"] = children(store.visible_evidence(id, filter));
            doc["assertions"] = children(store.visible_assertions(id, filter));
        }
        RecordData::Gene(_) => {
            doc["variants"] = children(store.visible_variants(id, filter));
        }
        _ => {}
    }
    Ok(doc)
}

fn children(records: Vec<&Record>) -> Value {
    Value::Array(records.into_iter().map(shallow).collect())
}

fn shallow(record: &Record) -> Value {
    let mut doc = json!({
        "id": record.id.id,
        "kind": record.kind().to_string(),
        "name": record.label(),
    });
    match &record.data {
        RecordData::Variant(v) => {
            if let Field::Known(coords) = &v.coordinates {
                doc["coordinates"] = serde_json::to_value(coords).unwrap_or(Value::Null);
            }
            if let Field::Known(gene) = &v.gene {
                doc["gene"] = json!(gene.to_string());
            }
        }
        RecordData::Evidence(e) => {
            if let Field::Known(status) = &e.status {
                doc["status"] = json!(status.to_string());
            }
            if let Field::Known(drugs) = &e.drugs {
                doc["drugs"] = json!(drugs.iter().map(|d| d.name.clone()).collect::<Vec<_>>());
            }
            if let Field::Known(Some(disease)) = &e.disease {
                doc["disease"] = json!(disease.name);
            }
        }
        RecordData::Assertion(a) => {
            if let Field::Known(status) = &a.status {
                doc["status"] = json!(status.to_string());
            }
        }
        RecordData::Gene(g) => {
            if let Field::Known(description) = &g.description {
                if !description.is_empty() {
                    doc["description"] = json!(description);
                }
            }
        }
        RecordData::Source(s) => {
            if let Field::Known(citation) = &s.citation {
                doc["citation"] = json!(citation);
            }
        }
    }
    doc
}
