//! Application wiring for the `granite-chat` command.

use crate::ai::{ChatCompletionService, Credentials, Endpoints, GraniteClient};
use crate::models::{
    ChatCompletion, ChatCompletionRequest, ChatMessage, Config, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE,
};
use crate::Result;
use tracing::info;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant";

/// Per-invocation knobs for a single exchange.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub system: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Sends one system + user exchange through a chat completion service.
pub struct App {
    chat: Box<dyn ChatCompletionService>,
    model: String,
}

impl App {
    /// Build an app around any service; used by tests to inject mocks.
    pub fn with_service(chat: Box<dyn ChatCompletionService>, model: String) -> Self {
        Self { chat, model }
    }

    /// Connect to Granite using environment configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let credentials = Credentials::new(config.api_key.clone(), config.project_id.clone());
        let endpoints = Endpoints {
            iam_url: config.iam_url.clone(),
            generation_url: config.generation_url.clone(),
        };

        let client =
            GraniteClient::new_with_client(credentials, endpoints, reqwest::Client::new()).await?;
        info!("Chat provider: Granite (model: {})", config.model);

        Ok(Self::with_service(Box::new(client), config.model.clone()))
    }

    pub fn build_request(&self, prompt: &str, options: &ChatOptions) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if !options.system.is_empty() {
            messages.push(ChatMessage::system(options.system.clone()));
        }
        messages.push(ChatMessage::user(prompt));

        ChatCompletionRequest::new(messages)
            .with_model(options.model.clone().unwrap_or_else(|| self.model.clone()))
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature)
    }

    pub async fn run(&self, prompt: &str, options: &ChatOptions) -> Result<ChatCompletion> {
        let request = self.build_request(prompt, options);
        info!(
            "Requesting completion (model: {}, max_tokens: {})",
            request.model, request.max_tokens
        );
        self.chat.create_chat_completion(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockChatClient;
    use crate::models::Role;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn app_with(mock: MockChatClient) -> App {
        App::with_service(Box::new(mock), "ibm/granite-3-8b-instruct".to_string())
    }

    #[test]
    fn test_build_request_with_defaults() {
        let app = app_with(MockChatClient::new());
        let request = app.build_request("What is the capital of France?", &ChatOptions::default());

        assert_eq!(
            request.messages,
            vec![
                ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
                ChatMessage::user("What is the capital of France?"),
            ]
        );
        assert_eq!(request.model, "ibm/granite-3-8b-instruct");
        assert_eq!(request.max_tokens, 900);
    }

    #[test]
    fn test_build_request_empty_system_is_omitted() {
        let app = app_with(MockChatClient::new());
        let options = ChatOptions {
            system: String::new(),
            model: Some("ibm/granite-3-2b-instruct".to_string()),
            max_tokens: 50,
            temperature: 1.2,
        };
        let request = app.build_request("hi", &options);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.model, "ibm/granite-3-2b-instruct");
        assert_eq!(request.max_tokens, 50);
        assert_eq!(request.temperature, 1.2);
    }

    #[tokio::test]
    async fn test_run_returns_completion() {
        let app = app_with(MockChatClient::new().with_response("Paris".to_string()));
        let completion = app
            .run("What is the capital of France?", &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.content(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_run_propagates_errors() {
        let app = app_with(MockChatClient::new().with_failure(500, "boom".to_string()));
        let err = app.run("hi", &ChatOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Request { status: 500, .. }));
    }
}
