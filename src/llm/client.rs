//! LlmClient - handles communication with an OpenAI-compatible
//! chat-completion endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The environment variable name for the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default base URL for the completion API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model to ask.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One message in a chat-completion conversation.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request body for the chat-completion endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// Response body from the chat-completion endpoint.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Errors that can occur while fetching an answer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Empty question")]
    EmptyQuestion,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Response contained no answer")]
    EmptyResponse,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// The credential is injected at construction so the client carries no
/// ambient state and can be pointed at a mock server in tests.
pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl LlmClient {
    /// Create a new LlmClient by reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` if the `OPENAI_API_KEY` environment
    /// variable is not set.
    pub fn new() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| LlmError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a new LlmClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, LlmError> {
        Self::build(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a new LlmClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Self::build(api_key, base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a new LlmClient with a custom model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, LlmError> {
        Self::build(api_key, DEFAULT_BASE_URL.to_string(), model)
    }

    fn build(api_key: String, base_url: String, model: String) -> Result<Self, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            model,
            http_client,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the model on an existing client.
    pub fn set_model(&mut self, model: String) {
        self.model = model;
    }

    /// Ask the model a question and return the first completion choice.
    ///
    /// Sends a single user-role message to `{base_url}/chat/completions`
    /// with a bearer credential. No retry, no backoff: one shot per call.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::EmptyQuestion` if the question is blank,
    /// `LlmError::ApiError` if the endpoint returns a non-success status,
    /// `LlmError::EmptyResponse` if there are no choices or no content,
    /// or `LlmError::HttpError` if the request itself fails.
    pub async fn ask(&self, question: &str) -> Result<String, LlmError> {
        if question.trim().is_empty() {
            return Err(LlmError::EmptyQuestion);
        }

        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: question.to_string(),
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_creates_client() {
        let client = LlmClient::with_api_key("test-api-key".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-api-key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_api_key_empty_returns_error() {
        let result = LlmClient::with_api_key("".to_string());
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_with_base_url_creates_client() {
        let client =
            LlmClient::with_base_url("test-key".to_string(), "https://custom.api".to_string())
                .unwrap();
        assert_eq!(client.api_key(), "test-key");
        assert_eq!(client.base_url(), "https://custom.api");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_model_creates_client() {
        let client =
            LlmClient::with_model("test-key".to_string(), "custom-model".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.model(), "custom-model");
    }

    #[test]
    fn test_set_model_overrides() {
        let mut client = LlmClient::with_api_key("k".to_string()).unwrap();
        client.set_model("other".to_string());
        assert_eq!(client.model(), "other");
    }

    #[test]
    fn test_llm_error_display() {
        assert_eq!(LlmError::MissingApiKey.to_string(), "API key not configured");
        assert_eq!(LlmError::EmptyQuestion.to_string(), "Empty question");
        assert_eq!(
            LlmError::ApiError("bad request".to_string()).to_string(),
            "API error: bad request"
        );
        assert_eq!(
            LlmError::EmptyResponse.to_string(),
            "Response contained no answer"
        );
    }
}
