use crate::api::{self, ApiError, Client, RawId, read_json};
use crate::types::records::{DocumentFile, DocumentFolder};

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FolderWire {
    id: RawId,
    name: String,
    color: String,
    icon: String,
    #[serde(default)]
    document_count: u64,
}

pub(crate) fn normalize_folder(wire: FolderWire) -> DocumentFolder {
    DocumentFolder {
        id: wire.id.into_string(),
        name: wire.name,
        color: wire.color,
        icon: wire.icon,
        document_count: wire.document_count,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DocumentWire {
    id: RawId,
    #[serde(default)]
    folder_id: Option<RawId>,
    name: String,
    file_type: String,
    #[serde(with = "time::serde::rfc3339")]
    added_at: OffsetDateTime,
    size: u64,
    #[serde(default)]
    folder: Option<FolderRefWire>,
}

#[derive(Debug, Clone, Deserialize)]
struct FolderRefWire {
    name: String,
    color: String,
}

pub(crate) fn normalize_document(wire: DocumentWire) -> DocumentFile {
    let (folder_name, folder_color) = match wire.folder {
        Some(folder) => (Some(folder.name), Some(folder.color)),
        None => (None, None),
    };
    DocumentFile {
        id: wire.id.into_string(),
        folder_id: wire.folder_id.map(RawId::into_string),
        name: wire.name,
        kind: wire.file_type,
        added_at: wire.added_at,
        size_bytes: wire.size,
        folder_name,
        folder_color,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFolder {
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl NewFolder {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl FolderUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = self.name.as_deref() {
            api::require("name", name)?;
        }
        Ok(())
    }
}

/// A file to send to the server. The whole payload is held in memory; this
/// layer does not stream.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub folder_id: Option<String>,
}

impl DocumentUpload {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("file name", &self.file_name)?;
        api::require("content type", &self.content_type)?;
        if self.bytes.is_empty() {
            return Err(ApiError::Invalid("file is empty".to_string()));
        }
        Ok(())
    }
}

/// A downloaded payload plus the content type the server declared for it.
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Client {
    pub async fn folders(&self) -> Result<Vec<DocumentFolder>, ApiError> {
        let wires: Vec<FolderWire> = self.get_json("/folders").await?;
        Ok(wires.into_iter().map(normalize_folder).collect())
    }

    pub async fn create_folder(&self, folder: &NewFolder) -> Result<DocumentFolder, ApiError> {
        folder.validate()?;
        let wire: FolderWire = self.post_json("/folders", folder).await?;
        Ok(normalize_folder(wire))
    }

    pub async fn update_folder(
        &self,
        id: &str,
        update: &FolderUpdate,
    ) -> Result<DocumentFolder, ApiError> {
        api::require("folder id", id)?;
        update.validate()?;
        let wire: FolderWire = self.put_json(&format!("/folders/{id}"), update).await?;
        Ok(normalize_folder(wire))
    }

    pub async fn delete_folder(&self, id: &str) -> Result<(), ApiError> {
        api::require("folder id", id)?;
        self.delete(&format!("/folders/{id}")).await
    }

    /// Lists documents, optionally scoped to one folder.
    pub async fn documents(&self, folder_id: Option<&str>) -> Result<Vec<DocumentFile>, ApiError> {
        let path = match folder_id {
            Some(folder_id) => format!("/documents?folder_id={folder_id}"),
            None => "/documents".to_string(),
        };
        let wires: Vec<DocumentWire> = self.get_json(&path).await?;
        Ok(wires.into_iter().map(normalize_document).collect())
    }

    pub async fn upload_document(&self, upload: &DocumentUpload) -> Result<DocumentFile, ApiError> {
        upload.validate()?;
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|err| {
                ApiError::Invalid(format!("invalid content type '{}': {err}", upload.content_type))
            })?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(folder_id) = upload.folder_id.as_deref() {
            form = form.text("folder_id", folder_id.to_string());
        }
        let response = self
            .dispatch(self.http().post(self.url("/documents")).multipart(form))
            .await?;
        let wire: DocumentWire = read_json(response).await?;
        Ok(normalize_document(wire))
    }

    /// Fetches a document's payload. Some failures come back as a JSON error
    /// body behind a success-looking route; those are detected by content type
    /// and surfaced as errors instead of bytes.
    pub async fn download_document(&self, id: &str) -> Result<Download, ApiError> {
        api::require("document id", id)?;
        let response = self
            .dispatch(self.http().get(self.url(&format!("/documents/{id}/download"))))
            .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        if content_type.starts_with("application/json") {
            let body = response
                .text()
                .await
                .map_err(|err| ApiError::Decode(format!("unreadable download body: {err}")))?;
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|field| field.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "download failed".to_string());
            return Err(ApiError::Decode(message));
        }
        let bytes = response.bytes().await?.to_vec();
        Ok(Download {
            content_type,
            bytes,
        })
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        api::require("document id", id)?;
        self.delete(&format!("/documents/{id}")).await
    }
}
