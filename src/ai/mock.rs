use super::format::format_response;
use super::types::{GenerationResult, TextGenerationResponse};
use super::ChatCompletionService;
use crate::models::{ChatCompletion, ChatCompletionRequest, Role};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<(u16, String)>>>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Make every call fail with a `Request` error carrying this status and body.
    pub fn with_failure(self, status: u16, body: String) -> Self {
        *self.failure.lock().unwrap() = Some((status, body));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatCompletionService for MockChatClient {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.requests.lock().unwrap().push(request.clone());

        if let Some((status, body)) = self.failure.lock().unwrap().clone() {
            return Err(Error::Request { status, body });
        }

        let generated_text = {
            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                // Echo the last user turn
                let last_user = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                format!("Mock reply to: {}", last_user)
            } else {
                responses[(count - 1) % responses.len()].clone()
            }
        };

        format_response(TextGenerationResponse {
            model_id: Some(request.model.clone()),
            results: vec![GenerationResult { generated_text }],
        })
    }
}
