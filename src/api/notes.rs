use crate::api::{self, ApiError, Client, RawId};
use crate::types::records::Note;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NoteWire {
    id: RawId,
    title: String,
    content: String,
    color: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

pub(crate) fn normalize_note(wire: NoteWire) -> Note {
    Note {
        id: wire.id.into_string(),
        title: wire.title,
        content: wire.content,
        color: wire.color,
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub color: String,
}

impl NewNote {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NoteUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = self.title.as_deref() {
            api::require("title", title)?;
        }
        Ok(())
    }
}

impl Client {
    pub async fn notes(&self) -> Result<Vec<Note>, ApiError> {
        let wires: Vec<NoteWire> = self.get_json("/notes").await?;
        Ok(wires.into_iter().map(normalize_note).collect())
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        note.validate()?;
        let wire: NoteWire = self.post_json("/notes", note).await?;
        Ok(normalize_note(wire))
    }

    pub async fn update_note(&self, id: &str, update: &NoteUpdate) -> Result<Note, ApiError> {
        api::require("note id", id)?;
        update.validate()?;
        let wire: NoteWire = self.put_json(&format!("/notes/{id}"), update).await?;
        Ok(normalize_note(wire))
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), ApiError> {
        api::require("note id", id)?;
        self.delete(&format!("/notes/{id}")).await
    }
}
