use crate::api::{self, ApiError, Client, RawId, UserWire, normalize_user};
use crate::types::records::{Priority, Task, TaskStatus};

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskWire {
    id: RawId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    priority: Priority,
    status: TaskStatus,
    #[serde(default)]
    assigned_users: Vec<UserWire>,
}

pub(crate) fn normalize_task(origin: &str, wire: TaskWire) -> Task {
    Task {
        id: wire.id.into_string(),
        title: wire.title,
        description: wire.description,
        date: wire.date,
        priority: wire.priority,
        status: wire.status,
        assigned_users: wire
            .assigned_users
            .into_iter()
            .map(|user| normalize_user(origin, user))
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub priority: Priority,
    pub status: TaskStatus,
    pub assigned_user_ids: Vec<String>,
}

impl NewTask {
    fn validate(&self) -> Result<(), ApiError> {
        api::require("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_ids: Option<Vec<String>>,
}

impl TaskUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = self.title.as_deref() {
            api::require("title", title)?;
        }
        Ok(())
    }
}

impl Client {
    pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        let wires: Vec<TaskWire> = self.get_json("/tasks").await?;
        Ok(wires
            .into_iter()
            .map(|wire| normalize_task(self.origin(), wire))
            .collect())
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        task.validate()?;
        let wire: TaskWire = self.post_json("/tasks", task).await?;
        Ok(normalize_task(self.origin(), wire))
    }

    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, ApiError> {
        api::require("task id", id)?;
        update.validate()?;
        let wire: TaskWire = self.put_json(&format!("/tasks/{id}"), update).await?;
        Ok(normalize_task(self.origin(), wire))
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        api::require("task id", id)?;
        self.delete(&format!("/tasks/{id}")).await
    }
}
