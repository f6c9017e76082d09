use crate::api::{self, ApiError, Client, RawId, UserWire, normalize_user};
use crate::types::records::CalendarEvent;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventWire {
    id: RawId,
    title: String,
    #[serde(with = "time::serde::rfc3339")]
    starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    ends_at: OffsetDateTime,
    color: String,
    #[serde(rename = "event_type")]
    kind: String,
    #[serde(default)]
    assigned_users: Vec<UserWire>,
}

pub(crate) fn normalize_event(origin: &str, wire: EventWire) -> CalendarEvent {
    CalendarEvent {
        id: wire.id.into_string(),
        title: wire.title,
        starts_at: wire.starts_at,
        ends_at: wire.ends_at,
        color: wire.color,
        kind: wire.kind,
        assigned_users: wire
            .assigned_users
            .into_iter()
            .map(|user| normalize_user(origin, user))
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    pub color: String,
    #[serde(rename = "event_type")]
    pub kind: String,
    pub assigned_user_ids: Vec<String>,
}

impl NewEvent {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("title", &self.title)?;
        if self.ends_at < self.starts_at {
            return Err(ApiError::Invalid(
                "event cannot end before it starts".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "event_type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_ids: Option<Vec<String>>,
}

impl EventUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = self.title.as_deref() {
            api::require("title", title)?;
        }
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at)
            && ends_at < starts_at
        {
            return Err(ApiError::Invalid(
                "event cannot end before it starts".to_string(),
            ));
        }
        Ok(())
    }
}

impl Client {
    pub async fn events(&self) -> Result<Vec<CalendarEvent>, ApiError> {
        let wires: Vec<EventWire> = self.get_json("/events").await?;
        Ok(wires
            .into_iter()
            .map(|wire| normalize_event(self.origin(), wire))
            .collect())
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, ApiError> {
        event.validate()?;
        let wire: EventWire = self.post_json("/events", event).await?;
        Ok(normalize_event(self.origin(), wire))
    }

    pub async fn update_event(
        &self,
        id: &str,
        update: &EventUpdate,
    ) -> Result<CalendarEvent, ApiError> {
        api::require("event id", id)?;
        update.validate()?;
        let wire: EventWire = self.put_json(&format!("/events/{id}"), update).await?;
        Ok(normalize_event(self.origin(), wire))
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        api::require("event id", id)?;
        self.delete(&format!("/events/{id}")).await
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::api::testing::{client_for, serve};
    use axum::Json;
    use axum::Router;
    use axum::routing::get;
    use time::format_description::well_known::Rfc3339;

    #[tokio::test]
    async fn events__should_map_event_type_to_kind() {
        // Given
        let router = Router::new().route(
            "/events",
            get(|| async {
                Json(serde_json::json!([
                    {
                        "id": 5,
                        "title": "Sprint planning",
                        "starts_at": "2025-01-13T09:00:00Z",
                        "ends_at": "2025-01-13T10:00:00Z",
                        "color": "#4f8a8b",
                        "event_type": "meeting",
                        "assigned_users": []
                    }
                ]))
            }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url);

        // When
        let events = client.events().await.expect("list events");

        // Then
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "5");
        assert_eq!(events[0].kind, "meeting");
        assert_eq!(
            events[0].starts_at,
            OffsetDateTime::parse("2025-01-13T09:00:00Z", &Rfc3339).expect("parse")
        );
    }

    #[tokio::test]
    async fn create_event__should_reject_inverted_time_range() {
        // Given
        let client = client_for("http://127.0.0.1:9");
        let starts_at = OffsetDateTime::parse("2025-01-13T10:00:00Z", &Rfc3339).expect("parse");
        let event = NewEvent {
            title: "Backwards".to_string(),
            starts_at,
            ends_at: starts_at - time::Duration::hours(1),
            color: "#000000".to_string(),
            kind: "meeting".to_string(),
            assigned_user_ids: Vec::new(),
        };

        // When
        let result = client.create_event(&event).await;

        // Then
        assert!(matches!(result, Err(ApiError::Invalid(_))));
    }
}
