use crate::api::{self, ApiError, Client, UserWire, normalize_user};
use crate::types::records::User;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Deserialize)]
struct SessionWire {
    token: String,
    user: UserWire,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("name", &self.name)?;
        validate_email(&self.email)?;
        api::require("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        api::require("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = self.name.as_deref() {
            api::require("name", name)?;
        }
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    api::require("email", email)?;
    if !email.contains('@') {
        return Err(ApiError::Invalid(format!("'{email}' is not an email address")));
    }
    Ok(())
}

impl Client {
    /// Registers a new account. The returned token becomes this session's
    /// credential.
    pub async fn register(&self, account: &NewAccount) -> Result<User, ApiError> {
        account.validate()?;
        let session: SessionWire = self.post_json("/auth/register", account).await?;
        self.credentials().set(session.token);
        Ok(normalize_user(self.origin(), session.user))
    }

    /// Logs in. The returned token becomes this session's credential.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        credentials.validate()?;
        let session: SessionWire = self.post_json("/auth/login", credentials).await?;
        self.credentials().set(session.token);
        Ok(normalize_user(self.origin(), session.user))
    }

    /// Tells the server to end the session, then drops the local credential
    /// regardless of the outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.post_empty("/auth/logout").await;
        self.credentials().clear();
        result
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let wire: UserWire = self.get_json("/profile").await?;
        Ok(normalize_user(self.origin(), wire))
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        update.validate()?;
        let wire: UserWire = self.put_json("/profile", update).await?;
        Ok(normalize_user(self.origin(), wire))
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let wires: Vec<UserWire> = self.get_json("/users").await?;
        Ok(wires
            .into_iter()
            .map(|wire| normalize_user(self.origin(), wire))
            .collect())
    }
}
