//! Embedding client: `embed(text) -> Vec<f32>` against an OpenAI-style
//! `/embeddings` endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

// --- Request/response (raw API shape for serde) ---

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Option<Vec<EmbedData>>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

// --- Client ---

/// HTTP embedding provider.
pub struct Embedder {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl Embedder {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RetrievalError::Config(format!("reqwest client: {e}")))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Embed one query string; returns the embedding vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let url = format!("{}/embeddings", self.api_base);
        let body = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(RetrievalError::Http(format!(
                "embeddings endpoint returned {status}"
            )));
        }
        let text_body = res
            .text()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;

        let parsed: EmbedResponse =
            serde_json::from_str(&text_body).map_err(|e| RetrievalError::Parse(e.to_string()))?;

        parsed
            .data
            .and_then(|mut data| {
                if data.is_empty() {
                    None
                } else {
                    Some(data.remove(0).embedding)
                }
            })
            .ok_or_else(|| RetrievalError::Parse("embeddings response had no data".to_string()))
    }
}
