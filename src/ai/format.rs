//! Translation between chat-style requests and Granite's prompt/response shapes.

use super::types::TextGenerationResponse;
use crate::models::{
    AssistantMessage, ChatCompletion, ChatCompletionRequest, ChatMessage, Choice, Role, Usage,
};
use crate::{Error, Result};
use chrono::Utc;
use serde_json::{Map, Value};

pub const START_OF_ROLE: &str = "<|start_of_role|>";
pub const END_OF_ROLE: &str = "<|end_of_role|>";
pub const END_OF_TEXT: &str = "<|end_of_text|>";

const FALLBACK_MODEL: &str = "ibm-model";

/// Flatten chat messages into a single Granite prompt.
///
/// Each message becomes `<|start_of_role|>{role}<|end_of_role|>{content}<|end_of_text|>\n`,
/// and the prompt always ends with an open assistant turn for the model to complete.
pub fn format_messages(messages: &[ChatMessage]) -> String {
    let mut formatted = String::new();
    for message in messages {
        formatted.push_str(START_OF_ROLE);
        formatted.push_str(message.role.as_str());
        formatted.push_str(END_OF_ROLE);
        formatted.push_str(&message.content);
        formatted.push_str(END_OF_TEXT);
        formatted.push('\n');
    }
    formatted.push_str(&assistant_prompt());
    formatted
}

/// The bare assistant-opening marker that terminates every prompt.
pub fn assistant_prompt() -> String {
    format!("{}{}{}", START_OF_ROLE, Role::Assistant.as_str(), END_OF_ROLE)
}

/// Build the provider `parameters` object. Extra params are applied last and win.
pub fn build_parameters(request: &ChatCompletionRequest) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert("decoding_method".to_string(), Value::from("greedy"));
    parameters.insert("max_new_tokens".to_string(), Value::from(request.max_tokens));
    parameters.insert("min_new_tokens".to_string(), Value::from(0));
    parameters.insert(
        "repetition_penalty".to_string(),
        Value::from(request.temperature),
    );
    for (key, value) in &request.extra_params {
        parameters.insert(key.clone(), value.clone());
    }
    parameters
}

/// Reshape a Granite generation response into an OpenAI-style completion.
pub fn format_response(response: TextGenerationResponse) -> Result<ChatCompletion> {
    let created = Utc::now().timestamp();

    let generated_text = response
        .results
        .into_iter()
        .next()
        .map(|result| result.generated_text)
        .ok_or_else(|| Error::UnexpectedResponse("No results in generation response".to_string()))?;

    Ok(ChatCompletion {
        id: format!("ibm_{}", created),
        object: "chat.completion".to_string(),
        created,
        model: response
            .model_id
            .unwrap_or_else(|| FALLBACK_MODEL.to_string()),
        choices: vec![Choice {
            index: 0,
            message: AssistantMessage {
                role: Role::Assistant,
                content: generated_text,
            },
            finish_reason: "stop".to_string(),
        }],
        usage: Usage::default(),
    })
}
