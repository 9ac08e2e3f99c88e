//! watsonx.ai and IAM wire payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Grant type for exchanging an IBM Cloud API key at the IAM endpoint.
pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Error code watsonx returns when the bearer token has expired or been revoked.
pub const TOKEN_NOT_VALID_CODE: &str = "authentication_token_not_valid";

/// Form body posted to the IAM token endpoint.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub apikey: &'a str,
}

/// Successful IAM token response. Other fields (`expires_in`, `refresh_token`, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Request body for `/ml/v1/text/generation`.
#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationRequest {
    pub input: String,
    pub parameters: Map<String, Value>,
    pub model_id: String,
    pub project_id: String,
}

/// Top-level text generation response.
#[derive(Debug, Deserialize)]
pub struct TextGenerationResponse {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub results: Vec<GenerationResult>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
pub struct GenerationResult {
    pub generated_text: String,
}

/// Structured error envelope returned on failures.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .any(|entry| entry.code.as_deref() == Some(code))
    }
}
