use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Fields no partial update may touch.
pub const ALWAYS_IMMUTABLE: [&str; 3] = ["id", "created_at", "updated_at"];

/// ===============================
/// Apply a partial JSON update
/// ===============================
///
/// `payload` must be a non-empty object whose keys are fields of `current`.
/// Nested objects are merged key by key; every other value replaces the
/// existing one. The merged document is deserialized back into `T`, so type
/// errors surface as 400s instead of corrupting the record.
pub fn merge_patch<T>(current: &T, payload: &Value, immutable: &[&str]) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
{
    let patch = payload
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Payload must be a JSON object".into()))?;

    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields provided for update".into()));
    }

    let mut doc = serde_json::to_value(current).map_err(|e| AppError::Internal(e.to_string()))?;
    let fields = doc
        .as_object_mut()
        .ok_or_else(|| AppError::Internal("Record did not serialize to an object".into()))?;

    // ---------- reject what must not change ----------
    for key in patch.keys() {
        if ALWAYS_IMMUTABLE.contains(&key.as_str()) || immutable.contains(&key.as_str()) {
            return Err(AppError::BadRequest(format!("Field '{key}' cannot be updated")));
        }
        if !fields.contains_key(key) {
            return Err(AppError::BadRequest(format!("Unknown field '{key}'")));
        }
    }

    merge_objects(fields, patch);

    serde_json::from_value(doc)
        .map_err(|e| AppError::BadRequest(format!("Invalid field value: {e}")))
}

fn merge_objects(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_objects(existing, nested),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Inner {
        street: String,
        city: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u64,
        name: String,
        salary: f64,
        note: Option<String>,
        address: Inner,
    }

    fn row() -> Row {
        Row {
            id: 1,
            name: "John".into(),
            salary: 100.0,
            note: None,
            address: Inner {
                street: "1 Main".into(),
                city: "SF".into(),
            },
        }
    }

    #[test]
    fn merges_top_level_and_nested_fields() {
        let updated = merge_patch(
            &row(),
            &json!({"salary": 120.5, "note": "raise", "address": {"city": "Oakland"}}),
            &[],
        )
        .unwrap();

        assert_eq!(updated.salary, 120.5);
        assert_eq!(updated.note.as_deref(), Some("raise"));
        assert_eq!(updated.address.street, "1 Main");
        assert_eq!(updated.address.city, "Oakland");
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        let err = merge_patch(&row(), &json!({}), &[]).unwrap_err();
        assert_eq!(err.to_string(), "No fields provided for update");

        let err = merge_patch(&row(), &json!([1, 2]), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Payload must be a JSON object");
    }

    #[test]
    fn rejects_immutable_and_unknown_fields() {
        let err = merge_patch(&row(), &json!({"id": 9}), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Field 'id' cannot be updated");

        let err = merge_patch(&row(), &json!({"name": "x"}), &["name"]).unwrap_err();
        assert_eq!(err.to_string(), "Field 'name' cannot be updated");

        let err = merge_patch(&row(), &json!({"shoe_size": 9}), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown field 'shoe_size'");
    }

    #[test]
    fn type_mismatch_is_a_bad_request() {
        let err = merge_patch(&row(), &json!({"salary": "lots"}), &[]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
