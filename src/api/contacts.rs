use crate::api::{self, ApiError, Client, RawId, absolute_asset_url};
use crate::types::records::Contact;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContactWire {
    id: RawId,
    name: String,
    email: String,
    phone: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

pub(crate) fn normalize_contact(origin: &str, wire: ContactWire) -> Contact {
    Contact {
        id: wire.id.into_string(),
        name: wire.name,
        email: wire.email,
        phone: wire.phone,
        role: wire.role,
        address: wire.address,
        company: wire.company,
        notes: wire.notes,
        avatar_url: absolute_asset_url(origin, wire.avatar),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewContact {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("name", &self.name)?;
        api::require("email", &self.email)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = self.name.as_deref() {
            api::require("name", name)?;
        }
        if let Some(email) = self.email.as_deref() {
            api::require("email", email)?;
        }
        Ok(())
    }
}

impl Client {
    pub async fn contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let wires: Vec<ContactWire> = self.get_json("/contacts").await?;
        Ok(wires
            .into_iter()
            .map(|wire| normalize_contact(self.origin(), wire))
            .collect())
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact, ApiError> {
        contact.validate()?;
        let wire: ContactWire = self.post_json("/contacts", contact).await?;
        Ok(normalize_contact(self.origin(), wire))
    }

    pub async fn update_contact(
        &self,
        id: &str,
        update: &ContactUpdate,
    ) -> Result<Contact, ApiError> {
        api::require("contact id", id)?;
        update.validate()?;
        let wire: ContactWire = self.put_json(&format!("/contacts/{id}"), update).await?;
        Ok(normalize_contact(self.origin(), wire))
    }

    pub async fn delete_contact(&self, id: &str) -> Result<(), ApiError> {
        api::require("contact id", id)?;
        self.delete(&format!("/contacts/{id}")).await
    }
}
