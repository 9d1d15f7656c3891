//! User handle.

use serde_json::Value;

use crate::client::FormhiveClient;
use crate::entity::{id_from_details, EntityCore, EntityOptions};
use crate::error::{Error, Result};
use crate::types::{Details, UsersEnvelope};

/// Handle to an account user.
///
/// Users carry no operations beyond the shared detail contract. The API
/// exposes no single-user endpoint, so a lazily constructed handle
/// resolves its details from the account's user listing.
pub struct User {
    core: EntityCore,
}

impl User {
    /// Create a handle from an id. Details are resolved lazily.
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

    /// Stable identifier (url slug).
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
                let payload = self.party().get("users", &[]).await?;
                let envelope: UsersEnvelope = serde_json::from_value(payload)?;
                envelope
                    .users
                    .unwrap_or_default()
                    .into_iter()
                    .find(|details| {
                        details.get("Url").and_then(Value::as_str) == Some(self.id())
                    })
                    .ok_or_else(|| Error::NotFound(format!("user {}", self.id())))
            })
            .await
    }

    /// A single detail value, e.g. `Email`.
    pub async fn detail(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.details().await?.get(key).cloned())
    }
}
