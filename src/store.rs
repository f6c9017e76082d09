use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

/// Read-through key/value shim over one JSON file, used when no backend is
/// reachable. The first read of a known key seeds a hardcoded default record
/// set; writes replace the whole value for a key. This world never
/// synchronizes with the server-backed entities.
pub struct LocalStore {
    path: PathBuf,
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Corrupt(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store io error: {err}"),
            StoreError::Corrupt(err) => write!(f, "store file is not valid json: {err}"),
        }
    }
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the stored value for `key`. An absent key with a known default
    /// seeds that default into the file first; an absent key without one
    /// yields `Value::Null`.
    pub fn read(&self, key: &str) -> Result<Value, StoreError> {
        let mut entries = self.load()?;
        if let Some(value) = entries.get(key) {
            return Ok(value.clone());
        }
        let Some(default) = seed_value(key) else {
            return Ok(Value::Null);
        };
        entries.insert(key.to_string(), default.clone());
        self.save(&entries)?;
        Ok(default)
    }

    /// Replaces the whole value for `key`.
    pub fn write(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value);
        self.save(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        serde_json::from_str(&contents).map_err(StoreError::Corrupt)
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(entries).map_err(StoreError::Corrupt)?;
        atomic_write_bytes(&self.path, &contents).map_err(StoreError::Io)
    }
}

fn atomic_write_bytes(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                use std::io::Write as _;
                file.write_all(contents)?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to create temp file",
    ))
}

fn seed_value(key: &str) -> Option<Value> {
    match key {
        "tasks" => Some(json!([
            {
                "id": "local-task-1",
                "title": "Review the weekly report",
                "description": "Focus on the numbers for Q1",
                "date": "2025-01-13T09:00:00Z",
                "priority": "high",
                "status": "pending",
                "assigned_users": []
            },
            {
                "id": "local-task-2",
                "title": "Order office supplies",
                "description": null,
                "date": "2025-01-15T10:00:00Z",
                "priority": "low",
                "status": "in_progress",
                "assigned_users": []
            }
        ])),
        "contacts" => Some(json!([
            {
                "id": "local-contact-1",
                "name": "Ana Torres",
                "email": "ana@example.com",
                "phone": "+34 600 000 001",
                "role": "Account manager",
                "address": null,
                "company": "Acme",
                "notes": null,
                "avatar_url": null
            }
        ])),
        "events" => Some(json!([
            {
                "id": "local-event-1",
                "title": "Sprint planning",
                "starts_at": "2025-01-13T09:00:00Z",
                "ends_at": "2025-01-13T10:00:00Z",
                "color": "#4f8a8b",
                "kind": "meeting",
                "assigned_users": []
            }
        ])),
        "folders" => Some(json!([
            {
                "id": "local-folder-1",
                "name": "Reports",
                "color": "#aa3355",
                "icon": "chart",
                "document_count": 0
            }
        ])),
        "notes" => Some(json!([
            {
                "id": "local-note-1",
                "title": "Welcome",
                "content": "This workspace is running without a backend.",
                "color": "#ffd166",
                "created_at": "2025-01-10T09:00:00Z",
                "updated_at": "2025-01-10T09:00:00Z"
            }
        ])),
        _ => None,
    }
}
