use crate::api::{self, ApiError, Client};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ChatRequestWire<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyWire {
    reply: String,
}

impl Client {
    /// Raw pass-through to the server-mediated assistant route. Prompt
    /// assembly lives in [`crate::assistant`].
    pub async fn ai_chat(&self, prompt: &str, context: Option<&str>) -> Result<String, ApiError> {
        api::require("prompt", prompt)?;
        let wire: ChatReplyWire = self
            .post_json("/ai/chat", &ChatRequestWire { prompt, context })
            .await?;
        Ok(wire.reply)
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::api::testing::{client_for, serve};
    use axum::Json;
    use axum::Router;
    use axum::routing::post;

    #[tokio::test]
    async fn ai_chat__should_return_reply_text() {
        // Given
        let router = Router::new().route(
            "/ai/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["prompt"], "What is on my plate today?");
                assert!(body.get("context").is_none());
                Json(serde_json::json!({"reply": "Two tasks and one meeting."}))
            }),
        );
        let base_url = serve(router).await;
        let client = client_for(&base_url);

        // When
        let reply = client
            .ai_chat("What is on my plate today?", None)
            .await
            .expect("chat");

        // Then
        assert_eq!(reply, "Two tasks and one meeting.");
    }
}
