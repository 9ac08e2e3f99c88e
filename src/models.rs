//! Data models and structures
//!
//! Defines the caller-facing chat types, the OpenAI-shaped completion
//! object returned to callers, and environment configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_MODEL: &str = "ibm/granite-3-8b-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 900;
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_GENERATION_URL: &str =
    "https://us-south.ml.cloud.ibm.com/ml/v1/text/generation?version=2023-05-29";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Caller-side chat completion request.
///
/// `temperature` is sent to Granite as `repetition_penalty`, not as a
/// sampling temperature. `extra_params` are merged into the provider's
/// `parameters` object after the defaults, so they may override any of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub extra_params: Map<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            extra_params: Map::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }
}

// OpenAI-style response models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatCompletion {
    /// Text of the first (and only) choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub project_id: String,
    pub model: String,
    pub iam_url: String,
    pub generation_url: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, applying the same
    /// required/optional rules as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        Ok(Self {
            api_key: required("API_KEY")?,
            project_id: required("PROJECT_ID")?,
            model: lookup("GRANITE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            iam_url: lookup("GRANITE_IAM_URL").unwrap_or_else(|| DEFAULT_IAM_URL.to_string()),
            generation_url: lookup("GRANITE_GENERATION_URL")
                .unwrap_or_else(|| DEFAULT_GENERATION_URL.to_string()),
        })
    }
}
