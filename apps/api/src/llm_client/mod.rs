/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Services depend on the `ChatModel` trait; `LlmClient` is the production backend.
///
/// Every call is a fresh single-turn request. Nothing is remembered between calls,
/// so interview state lives in the session, never in the provider.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod json_repair;
pub mod lenient;
pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls. Hardcoded to prevent drift between environments.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
/// First backoff delay; doubles on every further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM output contained no decodable JSON")]
    MalformedJson,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A chat-completion backend. Carried in `AppState` as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one user prompt with a system prompt and returns the reply text.
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates all text blocks; `None` when there is no non-empty text.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Production chat backend over the Anthropic Messages API,
/// with retry logic for rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_url,
            api_key,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.call(prompt, system, temperature)
            .await?
            .text()
            .ok_or(LlmError::EmptyContent)
    }
}

/// Calls the model and decodes its reply as JSON into `T`.
/// The prompt must instruct the model to return JSON; fences and minor
/// formatting damage are repaired before decoding.
pub async fn call_json<T: DeserializeOwned>(
    llm: &dyn ChatModel,
    prompt: &str,
    system: &str,
    temperature: f32,
) -> Result<T, LlmError> {
    let text = llm.complete(prompt, system, temperature).await?;
    debug!("LLM reply received ({} chars)", text.chars().count());

    let value = json_repair::parse_llm_json(&text).ok_or(LlmError::MalformedJson)?;
    serde_json::from_value(value).map_err(LlmError::Parse)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedChatModel;
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Greeting {
        greeting: String,
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: LlmResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "text", "text": "{\"a\": "},
                    {"type": "tool_use"},
                    {"type": "text", "text": "1}"}
                ],
                "usage": {"input_tokens": 10, "output_tokens": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_response_text_none_when_blank() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "  "}], "usage": {"input_tokens": 1, "output_tokens": 0}}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
    }

    #[tokio::test]
    async fn test_call_json_strips_fences() {
        let llm = ScriptedChatModel::new(["```json\n{\"greeting\": \"hello\"}\n```"]);
        let parsed: Greeting = call_json(&llm, "say hi", "system", 0.3).await.unwrap();
        assert_eq!(parsed.greeting, "hello");
    }

    #[tokio::test]
    async fn test_call_json_rejects_prose() {
        let llm = ScriptedChatModel::new(["I cannot help with that."]);
        let err = call_json::<Greeting>(&llm, "say hi", "system", 0.3)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedJson));
    }

    #[tokio::test]
    async fn test_call_json_propagates_api_failure() {
        let llm = ScriptedChatModel::default();
        llm.push_failure("overloaded");
        let err = call_json::<Greeting>(&llm, "say hi", "system", 0.3)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    const REPLY: &str = r#"{"content": [{"type": "text", "text": "hello"}],
        "usage": {"input_tokens": 3, "output_tokens": 1}}"#;

    fn client(server: &testing::StubServer) -> LlmClient {
        LlmClient::new(format!("{}/v1/messages", server.url), "test-key".to_string())
            .unwrap()
            .with_retry_base_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_success() {
        let server = testing::StubServer::start(&[
            (500, r#"{"error": {"message": "internal"}}"#),
            (429, r#"{"error": {"message": "slow down"}}"#),
            (200, REPLY),
        ])
        .await;

        let reply = client(&server).complete("hi", "system", 0.3).await.unwrap();

        assert_eq!(reply, "hello");
        assert_eq!(server.hits(), 3);
    }

    #[tokio::test]
    async fn test_persistent_server_error_gives_up_after_three_attempts() {
        let server = testing::StubServer::start(&[(503, "overloaded")]).await;

        let err = client(&server).complete("hi", "system", 0.3).await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(server.hits(), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_client_error_fails_fast_with_provider_message() {
        let server = testing::StubServer::start(&[(
            400,
            r#"{"type": "error", "error": {"type": "invalid_request_error", "message": "max_tokens too large"}}"#,
        )])
        .await;

        let err = client(&server).complete("hi", "system", 0.3).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "max_tokens too large");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_content() {
        let server = testing::StubServer::start(&[(
            200,
            r#"{"content": [], "usage": {"input_tokens": 3, "output_tokens": 0}}"#,
        )])
        .await;

        let err = client(&server).complete("hi", "system", 0.3).await.unwrap_err();

        assert!(matches!(err, LlmError::EmptyContent));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_http_error() {
        let client = LlmClient::new("http://127.0.0.1:9/v1/messages".to_string(), "k".to_string())
            .unwrap()
            .with_retry_base_delay(Duration::from_millis(1));

        let err = client.complete("hi", "system", 0.3).await.unwrap_err();

        assert!(matches!(err, LlmError::Http(_)));
    }
}
