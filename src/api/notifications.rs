use crate::api::{self, ApiError, Client, RawId};
use crate::types::records::Notification;

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NotificationWire {
    id: RawId,
    title: String,
    message: String,
    #[serde(rename = "notification_type")]
    kind: String,
    #[serde(default)]
    related_type: Option<String>,
    #[serde(default)]
    related_id: Option<RawId>,
    read: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

pub(crate) fn normalize_notification(wire: NotificationWire) -> Notification {
    Notification {
        id: wire.id.into_string(),
        title: wire.title,
        message: wire.message,
        kind: wire.kind,
        entity_kind: wire.related_type,
        entity_id: wire.related_id.map(RawId::into_string),
        read: wire.read,
        created_at: wire.created_at,
    }
}

impl Client {
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let wires: Vec<NotificationWire> = self.get_json("/notifications").await?;
        Ok(wires.into_iter().map(normalize_notification).collect())
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
        api::require("notification id", id)?;
        self.put_empty(&format!("/notifications/{id}/read")).await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.put_empty("/notifications/read-all").await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<(), ApiError> {
        api::require("notification id", id)?;
        self.delete(&format!("/notifications/{id}")).await
    }
}
