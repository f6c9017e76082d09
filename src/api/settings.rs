use crate::api::{ApiError, Client};
use crate::types::records::AppSettings;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct AppSettingsWire {
    app_name: String,
    #[serde(default)]
    ai_enabled: bool,
    #[serde(default)]
    push_enabled: bool,
}

impl Client {
    pub async fn app_settings(&self) -> Result<AppSettings, ApiError> {
        let wire: AppSettingsWire = self.get_json("/config/app").await?;
        Ok(AppSettings {
            app_name: wire.app_name,
            ai_enabled: wire.ai_enabled,
            push_enabled: wire.push_enabled,
        })
    }
}
