//! Report handle and its operations.

use serde_json::Value;

use crate::client::FormhiveClient;
use crate::entity::{id_from_details, EntityCore, EntityOptions};
use crate::error::{Error, Result};
use crate::types::{Details, Field, FieldsEnvelope, ReportsEnvelope, WidgetsEnvelope};

/// Handle to a single report.
///
/// Obtained from [`FormhiveClient::reports`] / [`FormhiveClient::report`]
/// or constructed directly from an id, in which case details load on
/// first access.
pub struct Report {
    core: EntityCore,
}

impl Report {
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
                    .get(&format!("reports/{}", self.id()), &[])
                    .await?;
                let envelope: ReportsEnvelope = serde_json::from_value(payload)?;
                envelope
                    .reports
                    .and_then(|reports| reports.into_iter().next())
                    .ok_or_else(|| Error::NotFound(format!("report {}", self.id())))
            })
            .await
    }

    /// A single detail value, e.g. `Name`.
    pub async fn detail(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.details().await?.get(key).cloned())
    }

    /// Field descriptors for the report.
    pub async fn fields(&self) -> Result<Vec<Field>> {
        let payload = self
            .party()
            .get(&format!("reports/{}/fields", self.id()), &[])
            .await?;
        let envelope: FieldsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.fields.unwrap_or_default())
    }

    /// Widget descriptors for the report.
    pub async fn widgets(&self) -> Result<Vec<Details>> {
        let payload = self
            .party()
            .get(&format!("reports/{}/widgets", self.id()), &[])
            .await?;
        let envelope: WidgetsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.widgets.unwrap_or_default())
    }
}
