use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Embedder, EmbeddingError, HashingEmbedder};

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    retry_base_delay: Duration,
}

impl HttpEmbedder {
    pub fn new(
        url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            url,
            model,
            api_key,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    async fn request_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut request = self.client.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut body: EmbeddingResponse = response.json().await?;
        if body.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} vectors, got {}",
                texts.len(),
                body.data.len()
            )));
        }
        body.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    /// Retries transport errors, 429 and 5xx with exponential backoff (1s, 2s).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "Embedding attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.request_once(texts).await {
                Ok(vectors) => {
                    debug!("Embedded {} texts via {}", texts.len(), self.url);
                    return Ok(vectors);
                }
                Err(EmbeddingError::Api { status, message })
                    if status != 429 && status < 500 =>
                {
                    return Err(EmbeddingError::Api { status, message });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::InvalidResponse("embedding retries exhausted".to_string())
        }))
    }
}

/// Remote embedder with a local hashing fallback for when the endpoint is unavailable.
pub struct FallbackEmbedder {
    primary: HttpEmbedder,
    fallback: HashingEmbedder,
}

impl FallbackEmbedder {
    pub fn new(primary: HttpEmbedder) -> Self {
        Self {
            primary,
            fallback: HashingEmbedder::default(),
        }
    }
}

#[async_trait]
impl Embedder for FallbackEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self.primary.embed_batch(texts).await {
            Ok(vectors) => Ok(vectors),
            Err(e) => {
                warn!("Embedding endpoint failed ({e}); using local hashing vectors");
                self.fallback.embed_batch(texts).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::StubServer;

    const VECTORS: &str = r#"{"data": [
        {"embedding": [0.0, 1.0], "index": 1},
        {"embedding": [1.0, 0.0], "index": 0}
    ]}"#;

    fn embedder(server: &StubServer) -> HttpEmbedder {
        HttpEmbedder::new(
            format!("{}/v1/embeddings", server.url),
            "all-minilm".to_string(),
            Some("secret".to_string()),
        )
        .unwrap()
        .with_retry_base_delay(Duration::from_millis(5))
    }

    fn texts() -> Vec<String> {
        vec!["first".to_string(), "second".to_string()]
    }

    #[test]
    fn test_response_deserializes_and_orders_by_index() {
        let mut body: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [
                {"embedding": [0.0, 1.0], "index": 1},
                {"embedding": [1.0, 0.0], "index": 0}
            ], "model": "all-minilm"}"#,
        )
        .unwrap();
        body.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        assert_eq!(body.data[0].embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn test_request_serializes_input_array() {
        let input = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(EmbeddingRequest {
            model: "all-minilm",
            input: &input,
        })
        .unwrap();
        assert_eq!(json["input"], serde_json::json!(["a", "b"]));
        assert_eq!(json["model"], "all-minilm");
    }

    #[tokio::test]
    async fn test_fallback_used_when_endpoint_unreachable() {
        // Port 9 (discard) on localhost refuses connections in test environments.
        let primary = HttpEmbedder::new(
            "http://127.0.0.1:9/v1/embeddings".to_string(),
            "all-minilm".to_string(),
            None,
        )
        .unwrap()
        .with_retry_base_delay(Duration::from_millis(1));
        let embedder = FallbackEmbedder::new(primary);

        let vectors = embedder
            .embed_batch(&["rust".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![HashingEmbedder::default().embed_text("rust")]);
    }

    #[tokio::test]
    async fn test_unavailable_endpoint_is_retried() {
        let server = StubServer::start(&[(503, "warming up"), (200, VECTORS)]).await;

        let vectors = embedder(&server).embed_batch(&texts()).await.unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_client_error_fails_fast() {
        let server = StubServer::start(&[(401, "bad key")]).await;

        let err = embedder(&server).embed_batch(&texts()).await.unwrap_err();

        assert!(matches!(err, EmbeddingError::Api { status: 401, .. }));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_short_vector_list_is_invalid() {
        let server = StubServer::start(&[(200, r#"{"data": [{"embedding": [1.0]}]}"#)]).await;

        let err = embedder(&server).embed_batch(&texts()).await.unwrap_err();

        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fallback_after_exhausted_retries() {
        let server = StubServer::start(&[(500, "down")]).await;
        let fallback = FallbackEmbedder::new(embedder(&server));

        let vectors = fallback.embed_batch(&texts()).await.unwrap();

        assert_eq!(server.hits(), MAX_RETRIES as usize);
        assert_eq!(vectors[0], HashingEmbedder::default().embed_text("first"));
    }
}
