//! HTTP client SDK for the Formhive forms-service API.
//!
//! This crate provides a typed async client for accounts, forms,
//! reports, users, entries, comments and webhooks. Every call is a
//! single authenticated round trip; service-reported failures and
//! connection-level failures surface as distinct [`Error`] variants,
//! and rejected submissions come back as ordinary [`SubmitResult`]
//! values to be inspected.
//!
//! # Example
//!
//! ```no_run
//! use formhive::{EntriesQuery, FormhiveClient, Submission};
//!
//! # async fn example() -> formhive::Result<()> {
//! let client = FormhiveClient::new("acme", "XXXX-XXXX-XXXX-XXXX")?;
//!
//! let form = client.form("contact-us").await?.expect("form exists");
//! println!("form name: {:?}", form.detail("Name").await?);
//!
//! // Query entries
//! let entries = form
//!     .entries(&EntriesQuery::new().filter("Field1", "Is_equal_to", "Tim"))
//!     .await?;
//! println!("{} matching entries", entries.len());
//!
//! // Submit an entry
//! let result = form
//!     .submit(Submission::new().field("Field1", "Tim").field("Field2", "Morgan"))
//!     .await?;
//! if !result.is_success() {
//!     for field_error in &result.field_errors {
//!         eprintln!("{}: {}", field_error.id, field_error.error_text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod entity;
pub mod error;
pub mod query;
pub mod submit;
pub mod types;

pub use client::{ClientBuilder, FormhiveClient};
pub use entity::{EntityOptions, Form, Report, User};
pub use error::{Error, Result};
pub use query::{CommentsQuery, EntriesQuery, Filter, FilterMatch};
pub use submit::{Submission, SubmitValue};
pub use types::{
    Details, Field, FieldError, FlattenedField, SubField, SubmitResult, WebHook,
};

/// API generation this client speaks.
pub const API_VERSION: &str = "3.0";
