//! Form handle and its operations.

use serde_json::Value;

use crate::client::FormhiveClient;
use crate::entity::{id_from_details, EntityCore, EntityOptions};
use crate::error::{Error, Result};
use crate::query::{CommentsQuery, EntriesQuery};
use crate::submit::{build_multipart, Submission};
use crate::types::{
    CommentsEnvelope, Details, EntriesEnvelope, EntryCountEnvelope, Field, FieldsEnvelope,
    FlattenedField, FormsEnvelope, SubmitResult, WebHook,
};

/// Handle to a single form.
///
/// Obtained from [`FormhiveClient::forms`] / [`FormhiveClient::form`]
/// (details already loaded) or constructed directly from an id, in which
/// case details load on first access:
///
/// ```no_run
/// use formhive::{EntityOptions, Form};
///
/// # async fn example() -> formhive::Result<()> {
/// let form = Form::new(
///     "contact-us",
///     EntityOptions::new().credentials("acme", "XXXX-XXXX-XXXX-XXXX"),
/// )?;
/// let name = form.detail("Name").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Form {
    core: EntityCore,
}

impl Form {
    /// Create a handle from an id or hash. Details are fetched lazily.
    pub fn new(id: impl Into<String>, options: EntityOptions) -> Result<Self> {
        Ok(Self {
            core: EntityCore::from_options(id.into(), options)?,
        })
    }

    pub(crate) fn from_details(party: FormhiveClient, details: Details) -> Self {
        let id = id_from_details(&details);
        Self {
            core: EntityCore::new(id, party, Some(details)),
        }
    }

    /// Stable identifier (url slug or hash).
    pub fn id(&self) -> &str {
        self.core.id()
    }

    fn party(&self) -> &FormhiveClient {
        self.core.party()
    }

    /// Full detail payload; fetched at most once and cached.
    pub async fn details(&self) -> Result<&Details> {
        self.core
            .cell()
            .get_or_try_init(|| async {
                let payload = self
                    .party()
                    .get(&format!("forms/{}", self.id()), &[])
                    .await?;
                let envelope: FormsEnvelope = serde_json::from_value(payload)?;
                envelope
                    .forms
                    .and_then(|forms| forms.into_iter().next())
                    .ok_or_else(|| Error::NotFound(format!("form {}", self.id())))
            })
            .await
    }

    /// A single detail value, e.g. `Name` or `RedirectMessage`.
    pub async fn detail(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.details().await?.get(key).cloned())
    }

    /// The form's stable hash, used to key the webhook endpoints.
    async fn hash(&self) -> Result<String> {
        self.detail("Hash")
            .await?
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(format!("form {} has no hash", self.id())))
    }

    /// Field descriptors for the form. Always fetched live, never cached.
    pub async fn fields(&self) -> Result<Vec<Field>> {
        let payload = self
            .party()
            .get(&format!("forms/{}/fields", self.id()), &[])
            .await?;
        let envelope: FieldsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.fields.unwrap_or_default())
    }

    /// Leaf-only field descriptors: composite fields expand into one
    /// descriptor per sub-field, titled `"<parent> - <sub>"`, with type
    /// and required flag inherited from the parent. By default only
    /// submittable fields (ids following the `Field…` convention) are
    /// returned; pass `all` to include the rest.
    pub async fn flattened_fields(&self, all: bool) -> Result<Vec<FlattenedField>> {
        Ok(flatten_fields(self.fields().await?, all))
    }

    /// Entries submitted to the form. Empty when none match.
    pub async fn entries(&self, query: &EntriesQuery) -> Result<Vec<Details>> {
        let payload = self
            .party()
            .get(&format!("forms/{}/entries", self.id()), &query.to_params())
            .await?;
        let envelope: EntriesEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.entries.unwrap_or_default())
    }

    /// Number of entries matching the query's filters.
    pub async fn count(&self, query: &EntriesQuery) -> Result<u64> {
        let payload = self
            .party()
            .get(
                &format!("forms/{}/entries/count", self.id()),
                &query.count_params(),
            )
            .await?;
        let envelope: EntryCountEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.entry_count)
    }

    /// Submit an entry. A rejection is a normal [`SubmitResult`] with
    /// `success` unset and `error_text` / `field_errors` populated, not
    /// an `Err`.
    pub async fn submit(&self, data: Submission) -> Result<SubmitResult> {
        let action = format!("forms/{}/entries", self.id());
        let (body, files) = data.into_parts();
        let payload = if files.is_empty() {
            self.party().post_form(&action, &body).await?
        } else {
            let form = build_multipart(body, files).await?;
            self.party().post_multipart(&action, form).await?
        };
        Ok(serde_json::from_value(payload)?)
    }

    /// Comments left on the form's entries.
    pub async fn comments(&self, query: &CommentsQuery) -> Result<Vec<Details>> {
        let payload = self
            .party()
            .get(&format!("forms/{}/comments", self.id()), &query.to_params())
            .await?;
        let envelope: CommentsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.comments.unwrap_or_default())
    }

    /// Register a webhook on this form.
    pub async fn add_webhook(
        &self,
        url: &str,
        metadata: bool,
        handshake_key: &str,
    ) -> Result<WebHook> {
        let hash = self.hash().await?;
        self.party()
            .add_webhook(&hash, url, metadata, handshake_key)
            .await
    }

    /// Remove a webhook registration from this form.
    pub async fn delete_webhook(&self, webhook_hash: &str) -> Result<Value> {
        let hash = self.hash().await?;
        self.party().delete_webhook(&hash, webhook_hash).await
    }
}

/// Expand composite fields into leaf descriptors.
fn flatten_fields(fields: Vec<Field>, all: bool) -> Vec<FlattenedField> {
    let mut flattened = Vec::new();
    for field in fields {
        if !all && !field.id.starts_with("Field") {
            continue;
        }
        let required = field.is_required.as_deref() == Some("1");
        match field.sub_fields {
            Some(sub_fields) => {
                for sub_field in sub_fields {
                    flattened.push(FlattenedField {
                        id: sub_field.id,
                        title: format!("{} - {}", field.title, sub_field.label),
                        field_type: field.field_type.clone(),
                        required,
                    });
                }
            }
            None => flattened.push(FlattenedField {
                id: field.id,
                title: field.title,
                field_type: field.field_type,
                required,
            }),
        }
    }
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(payload: Value) -> Vec<Field> {
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn composite_fields_expand_in_place() {
        let flattened = flatten_fields(
            fields(json!([
                {
                    "ID": "Field3",
                    "Title": "Address",
                    "Type": "address",
                    "IsRequired": "1",
                    "SubFields": [
                        {"ID": "Field3", "Label": "Street"},
                        {"ID": "Field5", "Label": "City"}
                    ]
                },
                {"ID": "Field7", "Title": "Birthday", "Type": "date", "IsRequired": "0"}
            ])),
            false,
        );

        assert_eq!(
            flattened,
            vec![
                FlattenedField {
                    id: "Field3".into(),
                    title: "Address - Street".into(),
                    field_type: "address".into(),
                    required: true,
                },
                FlattenedField {
                    id: "Field5".into(),
                    title: "Address - City".into(),
                    field_type: "address".into(),
                    required: true,
                },
                FlattenedField {
                    id: "Field7".into(),
                    title: "Birthday".into(),
                    field_type: "date".into(),
                    required: false,
                },
            ]
        );
    }

    #[test]
    fn non_submittable_fields_are_filtered() {
        let descriptors = fields(json!([
            {"ID": "Field1", "Title": "Name", "Type": "shortname"},
            {"ID": "EntryId", "Title": "Entry Id", "Type": "system"},
            {"ID": "DateCreated", "Title": "Created", "Type": "system"}
        ]));

        let flattened = flatten_fields(descriptors.clone(), false);
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].id, "Field1");

        let flattened = flatten_fields(descriptors, true);
        assert_eq!(flattened.len(), 3);
    }

    #[test]
    fn required_needs_the_string_sentinel() {
        let flattened = flatten_fields(
            fields(json!([
                {"ID": "Field1", "Title": "Name", "Type": "shortname", "IsRequired": "1"},
                {"ID": "Field2", "Title": "Nickname", "Type": "shortname", "IsRequired": "0"},
                {"ID": "Field3", "Title": "Motto", "Type": "text"}
            ])),
            false,
        );
        assert!(flattened[0].required);
        assert!(!flattened[1].required);
        assert!(!flattened[2].required);
    }
}
