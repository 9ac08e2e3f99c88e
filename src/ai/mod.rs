//! Granite text generation behind an OpenAI-style chat completion interface
//!
//! Handles the IAM token exchange, prompt flattening, and reshaping of the
//! provider response into a `chat.completion` object.

pub mod client;
pub mod format;
pub mod mock;
pub mod types;

pub use client::{Credentials, Endpoints, GraniteClient};
pub use format::{format_messages, format_response};
pub use mock::MockChatClient;

use crate::models::{ChatCompletion, ChatCompletionRequest};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion>;
}
