//! Embedding-backed similarity over an OpenAI-compatible `/embeddings` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cosine::cosine_similarity;
use crate::error::SimilarityError;
use crate::{Result, SimilarityService};

/// Embedding endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    /// Embedding model name
    pub model: String,
    /// Bearer token (optional for local servers)
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            endpoint: std::env::var("BRANDGUARD_EMBEDDINGS_URL")
                .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
            model: std::env::var("BRANDGUARD_EMBEDDINGS_MODEL")
                .unwrap_or_else(|_| "all-minilm".to_string()),
            api_key: std::env::var("BRANDGUARD_EMBEDDINGS_API_KEY").ok(),
            timeout_ms: 30_000,
        }
    }
}

impl EmbeddingConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Config for a specific endpoint and model
    pub fn new(endpoint: &str, model: &str) -> Self {
        EmbeddingConfig {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
            timeout_ms: 30_000,
        }
    }

    /// Set authentication token
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 2],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Similarity client that embeds both texts in one request.
pub struct EmbeddingSimilarity {
    config: EmbeddingConfig,
    http_client: reqwest::Client,
}

impl EmbeddingSimilarity {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(SimilarityError::NotConfigured("endpoint is empty".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("brandguard-similarity/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingConfig::from_env())
    }

    async fn embed_pair(&self, text_a: &str, text_b: &str) -> Result<(Vec<f32>, Vec<f32>)> {
        let url = format!("{}/embeddings", self.config.endpoint.trim_end_matches('/'));
        let mut request = self.http_client.post(&url).json(&EmbeddingRequest {
            model: &self.config.model,
            input: [text_a, text_b],
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != 2 {
            return Err(SimilarityError::MalformedResponse(format!(
                "expected 2 embeddings, got {}",
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|item| item.index);
        let b = parsed.data.pop().map(|i| i.embedding).unwrap_or_default();
        let a = parsed.data.pop().map(|i| i.embedding).unwrap_or_default();
        debug!(dims = a.len(), model = %self.config.model, "embedded text pair");
        Ok((a, b))
    }
}

#[async_trait]
impl SimilarityService for EmbeddingSimilarity {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        let (a, b) = self.embed_pair(text_a, text_b).await?;
        Ok(cosine_similarity(&a, &b))
    }
}
