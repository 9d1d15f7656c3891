//! Lazy-loading handles to remote resources.
//!
//! A [`Form`], [`Report`] or [`User`] holds a stable id, a back-reference
//! to the owning client, and a detail cache that is populated by at most
//! one fetch, on first access. Handles come from two paths: eagerly from
//! a listing (the payload is already in hand) or lazily from an id plus
//! [`EntityOptions`] naming either an existing client or full
//! credentials.

mod form;
mod report;
mod user;

pub use form::Form;
pub use report::Report;
pub use user::User;

use tokio::sync::OnceCell;

use crate::client::FormhiveClient;
use crate::error::{Error, Result};
use crate::types::Details;

/// Construction options for the lazy entity path.
///
/// ```no_run
/// use formhive::{EntityOptions, Form};
///
/// let form = Form::new(
///     "contact-us",
///     EntityOptions::new().credentials("acme", "XXXX-XXXX-XXXX-XXXX"),
/// )?;
/// # Ok::<(), formhive::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    party: Option<FormhiveClient>,
    account: Option<String>,
    api_key: Option<String>,
    details: Option<Details>,
}

impl EntityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client for all network operations.
    pub fn party(mut self, party: FormhiveClient) -> Self {
        self.party = Some(party);
        self
    }

    /// Construct a dedicated client from account credentials.
    pub fn credentials(
        mut self,
        account: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.account = Some(account.into());
        self.api_key = Some(api_key.into());
        self
    }

    /// Seed the detail cache; no fetch will ever run.
    pub fn details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }
}

/// Shared state of every entity variant.
#[derive(Debug)]
pub(crate) struct EntityCore {
    id: String,
    party: FormhiveClient,
    details: OnceCell<Details>,
}

impl EntityCore {
    pub(crate) fn new(id: String, party: FormhiveClient, details: Option<Details>) -> Self {
        let details = match details {
            Some(details) => OnceCell::new_with(Some(details)),
            None => OnceCell::new(),
        };
        Self { id, party, details }
    }

    /// Resolve the owning client out of [`EntityOptions`]. Fails
    /// synchronously when neither a client nor complete credentials are
    /// given.
    pub(crate) fn from_options(id: String, options: EntityOptions) -> Result<Self> {
        let EntityOptions {
            party,
            account,
            api_key,
            details,
        } = options;
        let party = match (party, account, api_key) {
            (Some(party), _, _) => party,
            (None, Some(account), Some(api_key)) => FormhiveClient::new(account, api_key)?,
            _ => {
                return Err(Error::Initialization(
                    "an entity needs either an existing client or both an account and an API key"
                        .to_string(),
                ))
            }
        };
        Ok(Self::new(id, party, details))
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn party(&self) -> &FormhiveClient {
        &self.party
    }

    pub(crate) fn cell(&self) -> &OnceCell<Details> {
        &self.details
    }
}

/// Pull the listing id out of a detail payload. Listings key every
/// resource by its `Url` slug.
pub(crate) fn id_from_details(details: &Details) -> String {
    details
        .get("Url")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_without_client_or_credentials_fail() {
        let err = EntityCore::from_options("contact-us".into(), EntityOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
    }

    #[test]
    fn partial_credentials_fail() {
        let options = EntityOptions {
            account: Some("acme".into()),
            ..EntityOptions::default()
        };
        let err = EntityCore::from_options("contact-us".into(), options).unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
    }

    #[test]
    fn credentials_build_a_dedicated_client() {
        let core = EntityCore::from_options(
            "contact-us".into(),
            EntityOptions::new().credentials("acme", "key"),
        )
        .unwrap();
        assert_eq!(core.id(), "contact-us");
        assert_eq!(core.party().account(), "acme");
    }

    #[test]
    fn seeded_details_skip_the_fetch() {
        let mut details = Details::new();
        details.insert("Name".into(), "Test Form".into());
        let core = EntityCore::from_options(
            "contact-us".into(),
            EntityOptions::new()
                .credentials("acme", "key")
                .details(details),
        )
        .unwrap();
        assert_eq!(
            core.cell().get().unwrap()["Name"],
            serde_json::Value::from("Test Form")
        );
    }
}
