//! Wire types for the Formhive API.
//!
//! The service speaks PascalCase JSON and is loosely typed: numeric
//! fields arrive as numbers on some endpoints and as numeric strings on
//! others, and most payloads may grow extra keys at any time. Structs
//! here rename accordingly, capture unknown keys where callers may care,
//! and decode numerics leniently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw detail payload for an entity, entry or comment: field name → value.
pub type Details = serde_json::Map<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────────────────────

/// A form or report field descriptor as returned by the `fields` endpoint.
///
/// A field is either a leaf (has a submittable column id) or a composite
/// carrying `sub_fields` (compound name/address inputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Column identifier, e.g. `Field1`.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Display title.
    #[serde(rename = "Title", default)]
    pub title: String,
    /// Field type, e.g. `shortname` or `date`.
    #[serde(rename = "Type", default)]
    pub field_type: String,
    /// Required flag; the service sends the string `"1"` when set.
    #[serde(rename = "IsRequired", default)]
    pub is_required: Option<String>,
    /// Sub-fields of a composite field.
    #[serde(rename = "SubFields", default)]
    pub sub_fields: Option<Vec<SubField>>,
    /// Any remaining descriptor keys.
    #[serde(flatten)]
    pub extra: Details,
}

/// A sub-field of a composite field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubField {
    /// Column identifier of the sub-field.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Sub-field label, e.g. `First` or `City`.
    #[serde(rename = "Label", default)]
    pub label: String,
    /// Any remaining descriptor keys.
    #[serde(flatten)]
    pub extra: Details,
}

/// A leaf-only field descriptor produced by [`Form::flattened_fields`].
///
/// [`Form::flattened_fields`]: crate::Form::flattened_fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedField {
    /// Column identifier.
    pub id: String,
    /// Display title; sub-fields are prefixed with their parent title.
    pub title: String,
    /// Field type, inherited from the parent for sub-fields.
    pub field_type: String,
    /// Whether the field must be submitted.
    pub required: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Submissions
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of an entry submission.
///
/// A rejected submission is a normal value, not an error: check
/// [`is_success`](Self::is_success) and inspect `error_text` /
/// `field_errors` when it is false.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResult {
    /// Success flag; zero on rejection.
    #[serde(rename = "Success", default, deserialize_with = "lenient_u64")]
    pub success: u64,
    /// Identifier of the created entry, on success.
    #[serde(rename = "EntryId", default, deserialize_with = "lenient_opt_u64")]
    pub entry_id: Option<u64>,
    /// Link to the created entry, on success.
    #[serde(rename = "EntryLink", default)]
    pub entry_link: Option<String>,
    /// Form-level error text, on rejection.
    #[serde(rename = "ErrorText", default)]
    pub error_text: Option<String>,
    /// Per-field rejections.
    #[serde(rename = "FieldErrors", default)]
    pub field_errors: Vec<FieldError>,
}

impl SubmitResult {
    /// Whether the entry was created.
    pub fn is_success(&self) -> bool {
        self.success != 0
    }
}

/// A per-field submission rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    /// Column identifier of the rejected field.
    #[serde(rename = "ID", default)]
    pub id: String,
    /// Rejection reason.
    #[serde(rename = "ErrorText", default)]
    pub error_text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

/// A webhook registration as returned by the webhooks endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebHook {
    /// Stable webhook hash; used to delete the registration.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Any remaining keys.
    #[serde(flatten)]
    pub extra: Details,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────
//
// Success payloads are keyed by resource name. Lists may be absent or
// null, so envelopes hold options and callers default to empty.

#[derive(Debug, Deserialize)]
pub(crate) struct FormsEnvelope {
    #[serde(rename = "Forms", default)]
    pub forms: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportsEnvelope {
    #[serde(rename = "Reports", default)]
    pub reports: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    #[serde(rename = "Users", default)]
    pub users: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldsEnvelope {
    #[serde(rename = "Fields", default)]
    pub fields: Option<Vec<Field>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntriesEnvelope {
    #[serde(rename = "Entries", default)]
    pub entries: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentsEnvelope {
    #[serde(rename = "Comments", default)]
    pub comments: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WidgetsEnvelope {
    #[serde(rename = "Widgets", default)]
    pub widgets: Option<Vec<Details>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryCountEnvelope {
    #[serde(rename = "EntryCount", default, deserialize_with = "lenient_u64")]
    pub entry_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebHookEnvelope {
    #[serde(rename = "WebHookPutResult")]
    pub result: WebHook,
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient numerics
// ─────────────────────────────────────────────────────────────────────────────

/// Read a number out of a value that may be a JSON number or a numeric
/// string.
pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_u64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {value}")))
}

pub(crate) fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_as_u64(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn submit_result_success() {
        let result: SubmitResult = serde_json::from_value(json!({
            "Success": 1,
            "EntryId": 42,
            "EntryLink": "https://acme.formhive.com/entries/42"
        }))
        .unwrap();
        assert!(result.is_success());
        assert_eq!(result.entry_id, Some(42));
        assert!(result.field_errors.is_empty());
    }

    #[test]
    fn submit_result_field_errors() {
        let result: SubmitResult = serde_json::from_value(json!({
            "Success": "0",
            "FieldErrors": [{"ID": "Field2", "ErrorText": "This field is required."}]
        }))
        .unwrap();
        assert!(!result.is_success());
        assert_eq!(result.entry_id, None);
        assert_eq!(result.field_errors.len(), 1);
        assert_eq!(result.field_errors[0].id, "Field2");
    }

    #[test]
    fn field_with_sub_fields() {
        let field: Field = serde_json::from_value(json!({
            "ID": "Field1",
            "Title": "Name",
            "Type": "shortname",
            "IsRequired": "1",
            "SubFields": [
                {"ID": "Field1", "Label": "First"},
                {"ID": "Field2", "Label": "Last"}
            ]
        }))
        .unwrap();
        assert_eq!(field.sub_fields.as_ref().unwrap().len(), 2);
        assert_eq!(field.sub_fields.unwrap()[1].label, "Last");
        assert_eq!(field.is_required.as_deref(), Some("1"));
    }

    #[test]
    fn lenient_numbers_accept_strings() {
        let envelope: EntryCountEnvelope =
            serde_json::from_value(json!({"EntryCount": "17"})).unwrap();
        assert_eq!(envelope.entry_count, 17);

        let envelope: EntryCountEnvelope =
            serde_json::from_value(json!({"EntryCount": 17})).unwrap();
        assert_eq!(envelope.entry_count, 17);
    }

    #[test]
    fn null_entries_read_as_absent() {
        let envelope: EntriesEnvelope = serde_json::from_value(json!({"Entries": null})).unwrap();
        assert!(envelope.entries.is_none());
    }
}
