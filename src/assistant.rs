use crate::api;
use crate::config::Locale;

const PERSONA: &str = "You are the built-in assistant of a personal office \
workspace. Answer briefly and concretely, in the language of the question. \
When the question concerns tasks, contacts, calendar events, documents or \
notes, prefer actionable suggestions over generic advice.";

#[derive(Debug)]
pub enum AssistantError {
    /// The server reports the assistant as switched off for this deployment.
    Disabled,
    Api(api::ApiError),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantError::Disabled => f.write_str("the assistant is disabled on this server"),
            AssistantError::Api(err) => write!(f, "assistant request failed: {err}"),
        }
    }
}

/// Builds the persona instruction, forwards prompts to the server-mediated
/// assistant route, and exposes both a typed result and the legacy
/// swallow-everything surface.
pub struct Assistant {
    api: api::Client,
    locale: Locale,
}

impl Assistant {
    pub fn new(api: api::Client, locale: Locale) -> Self {
        Self { api, locale }
    }

    pub async fn ask(
        &self,
        prompt: &str,
        conversation: Option<&str>,
    ) -> Result<String, AssistantError> {
        let context = build_context(conversation);
        self.api
            .ai_chat(prompt, Some(&context))
            .await
            .map_err(|err| match err {
                api::ApiError::Status { status: 503, .. } => AssistantError::Disabled,
                other => AssistantError::Api(other),
            })
    }

    /// The original client surface: any failure collapses into a fixed,
    /// localized apology. Callers that need to tell failures apart use
    /// [`Assistant::ask`].
    pub async fn ask_or_apology(&self, prompt: &str, conversation: Option<&str>) -> String {
        match self.ask(prompt, conversation).await {
            Ok(reply) => reply,
            Err(err) => {
                eprintln!("assistant error: {err}");
                apology(self.locale).to_string()
            }
        }
    }
}

fn build_context(conversation: Option<&str>) -> String {
    match conversation {
        Some(conversation) if !conversation.trim().is_empty() => {
            format!("{PERSONA}\n\nConversation so far:\n{conversation}")
        }
        _ => PERSONA.to_string(),
    }
}

fn apology(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Sorry, I cannot process your request right now. Please try again later.",
        Locale::Es => "Lo siento, no puedo procesar tu solicitud en este momento. Inténtalo de nuevo más tarde.",
    }
}
