use super::format::{build_parameters, format_messages, format_response};
use super::types::{
    ErrorBody, TextGenerationRequest, TextGenerationResponse, TokenRequest, TokenResponse,
    APIKEY_GRANT_TYPE, TOKEN_NOT_VALID_CODE,
};
use super::ChatCompletionService;
use crate::models::{
    ChatCompletion, ChatCompletionRequest, DEFAULT_GENERATION_URL, DEFAULT_IAM_URL,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use tokio::sync::RwLock;

const IAM_TOKEN_PATH: &str = "/identity/token";
const GENERATION_PATH: &str = "/ml/v1/text/generation?version=2023-05-29";

/// IBM Cloud API key plus the watsonx project the generations are billed to.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    project_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Full URLs of the IAM token endpoint and the text generation endpoint.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub iam_url: String,
    pub generation_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            iam_url: DEFAULT_IAM_URL.to_string(),
            generation_url: DEFAULT_GENERATION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Serve both endpoints from one host, using the standard IBM paths.
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            iam_url: format!("{}{}", base_url, IAM_TOKEN_PATH),
            generation_url: format!("{}{}", base_url, GENERATION_PATH),
        }
    }
}

/// watsonx.ai Granite client speaking the OpenAI chat-completion shape.
///
/// The bearer token is fetched at construction and refreshed only when a
/// generation call is rejected with `authentication_token_not_valid`.
pub struct GraniteClient {
    client: Client,
    credentials: Credentials,
    endpoints: Endpoints,
    access_token: RwLock<String>,
}

impl GraniteClient {
    /// Construct a client against the public IBM endpoints and fetch a token.
    pub async fn new(credentials: Credentials) -> Result<Self> {
        Self::new_with_client(credentials, Endpoints::default(), Client::new()).await
    }

    /// Construct a client with explicit endpoints and HTTP client, then fetch a token.
    ///
    /// Fails with [`Error::Authentication`] if the identity service rejects the key.
    pub async fn new_with_client(
        credentials: Credentials,
        endpoints: Endpoints,
        client: Client,
    ) -> Result<Self> {
        let granite = Self {
            client,
            credentials,
            endpoints,
            access_token: RwLock::new(String::new()),
        };
        granite.refresh_token().await?;
        Ok(granite)
    }

    /// Exchange the API key for a fresh bearer token and store it.
    pub async fn refresh_token(&self) -> Result<()> {
        tracing::debug!("Requesting IAM access token");

        let form = TokenRequest {
            grant_type: APIKEY_GRANT_TYPE,
            apikey: &self.credentials.api_key,
        };

        let response = self
            .client
            .post(&self.endpoints.iam_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send token request to IAM: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            tracing::error!("IAM token error (status {}): {}", status, body);
            return Err(Error::Authentication(body));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse IAM token response: {}", e);
            e
        })?;
        if token.access_token.is_empty() {
            return Err(Error::Authentication(
                "IAM response contained an empty access_token".to_string(),
            ));
        }

        *self.access_token.write().await = token.access_token;
        tracing::info!("Refreshed IAM access token");
        Ok(())
    }

    /// Send a chat completion, re-authenticating and retrying once if the token expired.
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion> {
        let body = TextGenerationRequest {
            input: format_messages(&request.messages),
            parameters: build_parameters(request),
            model_id: request.model.clone(),
            project_id: self.credentials.project_id.clone(),
        };

        let (mut status, mut text) = self.send_generation(&body).await?;

        if status == StatusCode::UNAUTHORIZED && token_not_valid(&text) {
            tracing::info!("Access token rejected, refreshing and retrying once");
            self.refresh_token().await?;
            (status, text) = self.send_generation(&body).await?;
        }

        if status != StatusCode::OK {
            tracing::error!("Granite API error (status {}): {}", status, text);
            return Err(Error::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        let response: TextGenerationResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Granite response: {}\nBody: {}", e, text);
            e
        })?;
        format_response(response)
    }

    async fn send_generation(&self, body: &TextGenerationRequest) -> Result<(StatusCode, String)> {
        tracing::debug!(model = %body.model_id, "Sending text generation request to Granite");

        let token = self.access_token.read().await.clone();
        let response = self
            .client
            .post(&self.endpoints.generation_url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Granite: {}", e);
                e
            })?;

        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// True only for a structured error body carrying the expired-token code.
fn token_not_valid(body: &str) -> bool {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(errors) => errors.has_code(TOKEN_NOT_VALID_CODE),
        Err(e) => {
            tracing::warn!("Unparseable 401 body, not retrying: {}", e);
            false
        }
    }
}

#[async_trait]
impl ChatCompletionService for GraniteClient {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion> {
        GraniteClient::create_chat_completion(self, request).await
    }
}
