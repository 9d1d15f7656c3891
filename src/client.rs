//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use serde_json::Value;
use url::Url;

use crate::entity::{Form, Report, User};
use crate::error::{Error, Result};
use crate::types::{
    value_as_u64, Details, FormsEnvelope, ReportsEnvelope, UsersEnvelope, WebHook, WebHookEnvelope,
};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production domain accounts live under.
const DEFAULT_DOMAIN: &str = "formhive.com";

/// Path segment of the current API generation.
const API_PATH: &str = "v3";

/// Endpoint of the credential-exchange login call.
const LOGIN_ENDPOINT: &str = "https://formhive.com/api/v3/login.json";

/// Formhive API client.
///
/// Holds the account credentials and dispatches authenticated requests.
/// Cloning is cheap and shares one transport; credentials are immutable
/// once built.
///
/// # Example
///
/// ```no_run
/// use formhive::FormhiveClient;
///
/// # async fn example() -> formhive::Result<()> {
/// let client = FormhiveClient::new("acme", "XXXX-XXXX-XXXX-XXXX")?;
///
/// for form in client.forms().await? {
///     println!("{}", form.id());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FormhiveClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Account identifier.
    account: String,
    /// API key; doubles as the basic-auth username.
    api_key: String,
    /// Origin requests are made against, e.g. `https://acme.formhive.com/`.
    origin: Url,
    /// Request timeout.
    timeout: Duration,
}

impl FormhiveClient {
    /// Create a client for an account with default settings.
    pub fn new(account: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder().account(account).api_key(api_key).build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The account identifier this client was built for.
    pub fn account(&self) -> &str {
        &self.inner.account
    }

    /// The origin requests are made against.
    pub fn endpoint(&self) -> &Url {
        &self.inner.origin
    }

    /// Exchange login credentials for account details (including the API
    /// key) via the production login endpoint. No account auth is
    /// attached; the body itself carries the credentials.
    pub async fn login(
        integration_key: &str,
        email: &str,
        password: &str,
        subdomain: Option<&str>,
    ) -> Result<Details> {
        Self::login_at(LOGIN_ENDPOINT, integration_key, email, password, subdomain).await
    }

    /// [`login`](Self::login) against an alternate endpoint.
    pub async fn login_at(
        endpoint: &str,
        integration_key: &str,
        email: &str,
        password: &str,
        subdomain: Option<&str>,
    ) -> Result<Details> {
        let mut body = vec![
            ("integrationKey".to_string(), integration_key.to_string()),
            ("email".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        if let Some(subdomain) = subdomain {
            body.push(("subdomain".to_string(), subdomain.to_string()));
        }

        let response = reqwest::Client::new()
            .post(endpoint)
            .form(&body)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;
        let payload = read_response(response).await?;
        Ok(serde_json::from_value(payload)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account resources
    // ─────────────────────────────────────────────────────────────────────────

    /// List the forms accessible to this account.
    pub async fn forms(&self) -> Result<Vec<Form>> {
        let payload = self.get("forms", &[]).await?;
        let envelope: FormsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope
            .forms
            .unwrap_or_default()
            .into_iter()
            .map(|details| Form::from_details(self.clone(), details))
            .collect())
    }

    /// Fetch a single form by id or hash. `Ok(None)` when the service
    /// answers without a form payload.
    pub async fn form(&self, form_id: &str) -> Result<Option<Form>> {
        let payload = self.get(&format!("forms/{form_id}"), &[]).await?;
        let envelope: FormsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope
            .forms
            .and_then(|forms| forms.into_iter().next())
            .map(|details| Form::from_details(self.clone(), details)))
    }

    /// List the reports accessible to this account.
    pub async fn reports(&self) -> Result<Vec<Report>> {
        let payload = self.get("reports", &[]).await?;
        let envelope: ReportsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope
            .reports
            .unwrap_or_default()
            .into_iter()
            .map(|details| Report::from_details(self.clone(), details))
            .collect())
    }

    /// Fetch a single report by id or hash.
    pub async fn report(&self, report_id: &str) -> Result<Option<Report>> {
        let payload = self.get(&format!("reports/{report_id}"), &[]).await?;
        let envelope: ReportsEnvelope = serde_json::from_value(payload)?;
        Ok(envelope
            .reports
            .and_then(|reports| reports.into_iter().next())
            .map(|details| Report::from_details(self.clone(), details)))
    }

    /// List the users of this account.
    pub async fn users(&self) -> Result<Vec<User>> {
        let payload = self.get("users", &[]).await?;
        let envelope: UsersEnvelope = serde_json::from_value(payload)?;
        Ok(envelope
            .users
            .unwrap_or_default()
            .into_iter()
            .map(|details| User::from_details(self.clone(), details))
            .collect())
    }

    /// Register a webhook on a form. `form_id` must be the form's stable
    /// hash.
    pub async fn add_webhook(
        &self,
        form_id: &str,
        url: &str,
        metadata: bool,
        handshake_key: &str,
    ) -> Result<WebHook> {
        let body = vec![
            ("url".to_string(), url.to_string()),
            ("handshakeKey".to_string(), handshake_key.to_string()),
            ("metadata".to_string(), metadata.to_string()),
        ];
        let payload = self
            .put_form(&format!("forms/{form_id}/webhooks"), &body)
            .await?;
        let envelope: WebHookEnvelope = serde_json::from_value(payload)?;
        Ok(envelope.result)
    }

    /// Remove a webhook registration from a form.
    pub async fn delete_webhook(&self, form_id: &str, webhook_hash: &str) -> Result<Value> {
        self.delete(&format!("forms/{form_id}/webhooks/{webhook_hash}"))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the URL for an action path segment.
    pub(crate) fn url(&self, action: &str) -> Result<Url> {
        let action = action.trim_matches('/');
        self.inner
            .origin
            .join(&format!("api/{API_PATH}/{action}.json"))
            .map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get(&self, action: &str, query: &[(String, String)]) -> Result<Value> {
        let url = self.url(action)?;
        tracing::debug!(action, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .basic_auth(&self.inner.api_key, Some(""))
            .timeout(self.inner.timeout)
            .send()
            .await?;
        read_response(response).await
    }

    /// Make a POST request with a form-encoded body.
    pub(crate) async fn post_form(&self, action: &str, body: &[(String, String)]) -> Result<Value> {
        let url = self.url(action)?;
        tracing::debug!(action, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .form(body)
            .basic_auth(&self.inner.api_key, Some(""))
            .timeout(self.inner.timeout)
            .send()
            .await?;
        read_response(response).await
    }

    /// Make a POST request with a multipart body.
    pub(crate) async fn post_multipart(
        &self,
        action: &str,
        form: multipart::Form,
    ) -> Result<Value> {
        let url = self.url(action)?;
        tracing::debug!(action, "POST (multipart)");
        let response = self
            .inner
            .http
            .post(url)
            .multipart(form)
            .basic_auth(&self.inner.api_key, Some(""))
            .timeout(self.inner.timeout)
            .send()
            .await?;
        read_response(response).await
    }

    /// Make a PUT request with a form-encoded body.
    pub(crate) async fn put_form(&self, action: &str, body: &[(String, String)]) -> Result<Value> {
        let url = self.url(action)?;
        tracing::debug!(action, "PUT");
        let response = self
            .inner
            .http
            .put(url)
            .form(body)
            .basic_auth(&self.inner.api_key, Some(""))
            .timeout(self.inner.timeout)
            .send()
            .await?;
        read_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, action: &str) -> Result<Value> {
        let url = self.url(action)?;
        tracing::debug!(action, "DELETE");
        let response = self
            .inner
            .http
            .delete(url)
            .basic_auth(&self.inner.api_key, Some(""))
            .timeout(self.inner.timeout)
            .send()
            .await?;
        read_response(response).await
    }
}

impl std::fmt::Debug for FormhiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormhiveClient")
            .field("account", &self.inner.account)
            .field("origin", &self.inner.origin.as_str())
            .finish_non_exhaustive()
    }
}

/// Read a response body and classify it.
pub(crate) async fn read_response(response: reqwest::Response) -> Result<Value> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("json"))
        .unwrap_or(false);
    let body = response.text().await?;
    classify(is_json, &body)
}

/// Classify a decoded response: connection-level failure, in-band
/// service error, or application data. Every verb funnels through here.
fn classify(is_json: bool, body: &str) -> Result<Value> {
    // A non-JSON answer means the request never reached the API proper
    // (wrong host, proxy error page); hand back the raw text.
    if !is_json {
        return Err(Error::Connection(body.trim().to_string()));
    }

    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        // Undecodable bodies share the error kind of a service 500 and
        // stay distinguishable by message.
        Err(err) => {
            return Err(Error::Api {
                code: 500,
                message: err.to_string(),
            })
        }
    };

    match payload {
        Value::String(text) => Err(Error::Connection(text)),
        Value::Object(ref map) if map.contains_key("HTTPCode") => {
            let code = value_as_u64(&map["HTTPCode"]).unwrap_or(500) as u16;
            let message = map
                .get("Text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Err(Error::Api { code, message })
        }
        payload => Ok(payload),
    }
}

/// Builder for creating a [`FormhiveClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    account: Option<String>,
    api_key: Option<String>,
    domain: Option<String>,
    account_prefix: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            account: None,
            api_key: None,
            domain: None,
            account_prefix: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the account identifier (required).
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the API key (required).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the service domain, e.g. for white-label deployments.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Override the subdomain prefix; defaults to the account identifier.
    pub fn account_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.account_prefix = Some(prefix.into());
        self
    }

    /// Replace the whole `https://<prefix>.<domain>` origin, e.g. for a
    /// staging environment. The `/api/v3/<action>.json` path scheme is
    /// unchanged.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<FormhiveClient> {
        let account = self
            .account
            .ok_or_else(|| Error::Initialization("account is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| Error::Initialization("api_key is required".to_string()))?;

        let origin = match self.base_url {
            Some(base_url) => base_url,
            None => {
                let domain = self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN);
                let prefix = self.account_prefix.as_deref().unwrap_or(&account);
                format!("https://{prefix}.{domain}")
            }
        };
        let mut origin = Url::parse(&origin)?;
        if !origin.path().ends_with('/') {
            origin.set_path(&format!("{}/", origin.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("formhive/{}", env!("CARGO_PKG_VERSION")));
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(FormhiveClient {
            inner: Arc::new(ClientInner {
                http,
                account,
                api_key,
                origin,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> FormhiveClient {
        FormhiveClient::new("acme", "XXXX-XXXX-XXXX-XXXX").unwrap()
    }

    #[test]
    fn builder_requires_credentials() {
        assert!(matches!(
            ClientBuilder::new().build(),
            Err(Error::Initialization(_))
        ));
        assert!(matches!(
            ClientBuilder::new().account("acme").build(),
            Err(Error::Initialization(_))
        ));
    }

    #[test]
    fn origin_derives_from_account() {
        assert_eq!(client().endpoint().as_str(), "https://acme.formhive.com/");
    }

    #[test]
    fn domain_and_prefix_overrides() {
        let client = FormhiveClient::builder()
            .account("acme")
            .api_key("key")
            .domain("forms.example.org")
            .account_prefix("acme-staging")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://acme-staging.forms.example.org/"
        );
    }

    #[test]
    fn base_url_override_wins() {
        let client = FormhiveClient::builder()
            .account("acme")
            .api_key("key")
            .base_url("http://127.0.0.1:9090")
            .build()
            .unwrap();
        assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:9090/");
    }

    #[test]
    fn url_building() {
        let client = client();
        assert_eq!(
            client.url("forms").unwrap().as_str(),
            "https://acme.formhive.com/api/v3/forms.json"
        );
        assert_eq!(
            client.url("forms/abc123/entries").unwrap().as_str(),
            "https://acme.formhive.com/api/v3/forms/abc123/entries.json"
        );
    }

    #[test]
    fn classify_passes_data_through() {
        let payload = classify(true, r#"{"Forms": []}"#).unwrap();
        assert_eq!(payload, json!({"Forms": []}));
    }

    #[test]
    fn classify_plaintext_as_connection_error() {
        let err = classify(false, "<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Connection(text) if text.contains("502")));
    }

    #[test]
    fn classify_bare_string_as_connection_error() {
        let err = classify(true, r#""service unavailable""#).unwrap_err();
        assert!(matches!(err, Error::Connection(text) if text == "service unavailable"));
    }

    #[test]
    fn classify_http_code_payloads() {
        let err = classify(true, r#"{"HTTPCode": 401, "Text": "Invalid API key"}"#).unwrap_err();
        assert!(matches!(
            &err,
            Error::Api { code: 401, message } if message == "Invalid API key"
        ));
        assert!(err.is_auth_error());

        // the service sometimes sends the code as a string
        let err = classify(true, r#"{"HTTPCode": "404", "Text": "No such form"}"#).unwrap_err();
        assert_eq!(err.code(), Some(404));
    }

    #[test]
    fn classify_malformed_json_as_internal_500() {
        let err = classify(true, "{\"Forms\": [").unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 500);
                assert!(!message.is_empty());
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
