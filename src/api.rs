use crate::config::ClientConfig;
use crate::types::records::User;

use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

mod assistant;
mod auth;
mod contacts;
mod credentials;
mod documents;
mod events;
mod notes;
mod notifications;
mod push;
mod settings;
mod tasks;

pub use auth::{Credentials, NewAccount, ProfileUpdate};
pub use contacts::{ContactUpdate, NewContact};
pub use credentials::CredentialStore;
pub use documents::{DocumentUpload, Download, FolderUpdate, NewFolder};
pub use events::{EventUpdate, NewEvent};
pub use notes::{NewNote, NoteUpdate};
pub use tasks::{NewTask, TaskUpdate};

#[derive(Debug)]
pub enum ApiError {
    Invalid(String),
    Network(reqwest::Error),
    Status { status: u16, message: String },
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Invalid(message) => write!(f, "invalid request: {message}"),
            ApiError::Network(err) => write!(f, "network error: {err}"),
            ApiError::Status { status, message } => write!(f, "server error ({status}): {message}"),
            ApiError::Decode(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// One session against the productivity server. Construction is the session
/// boundary; the credential cell is shared between clones of the same client.
///
/// Calls carry no timeout and are never retried here; both are owned by the
/// caller.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    origin: String,
    credentials: CredentialStore,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|err| ApiError::Invalid(format!("invalid base url '{base_url}': {err}")))?;
        let origin = parsed.origin().ascii_serialization();
        let http = reqwest::Client::builder()
            .user_agent(concat!("satchel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            origin,
            credentials: CredentialStore::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub(crate) fn origin(&self) -> &str {
        &self.origin
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request with the stored bearer credential attached, if any.
    /// A 401 response clears the credential if and only if one was attached
    /// to this request; an anonymous 401 passes through unchanged.
    pub(crate) async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.credentials.current();
        let builder = match token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            self.credentials.clear();
        }
        if status.is_success() {
            return Ok(response);
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(response).await,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.dispatch(self.http.get(self.url(path))).await?;
        read_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .dispatch(self.http.post(self.url(path)).json(body))
            .await?;
        read_json(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .dispatch(self.http.put(self.url(path)).json(body))
            .await?;
        read_json(response).await
    }

    pub(crate) async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.dispatch(self.http.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.http.post(self.url(path))).await?;
        Ok(())
    }

    pub(crate) async fn put_empty(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.http.put(self.url(path))).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|err| ApiError::Decode(format!("unexpected response body: {err}")))
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let fallback = format!("request failed with status {status}");
    let Ok(body) = response.text().await else {
        return fallback;
    };
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|field| field.as_str())
            .map(str::to_string)
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Server identifiers arrive as strings or numbers depending on the backing
/// store; the client always holds strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    pub(crate) fn into_string(self) -> String {
        match self {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserWire {
    pub(crate) id: RawId,
    pub(crate) email: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) avatar: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub(crate) created_at: Option<OffsetDateTime>,
}

pub(crate) fn normalize_user(origin: &str, wire: UserWire) -> User {
    User {
        id: wire.id.into_string(),
        email: wire.email,
        name: wire.name,
        role: wire.role,
        avatar_url: absolute_asset_url(origin, wire.avatar),
        created_at: wire.created_at,
    }
}

pub(crate) fn absolute_asset_url(origin: &str, path: Option<String>) -> Option<String> {
    let path = path?;
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    if trimmed.starts_with('/') {
        Some(format!("{origin}{trimmed}"))
    } else {
        Some(format!("{origin}/{trimmed}"))
    }
}
