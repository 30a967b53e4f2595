//! Vector-index client: `has_index`, `describe_stats`, `query` against a
//! Pinecone-style REST API.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::retrieval::RetrievalError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

// --- Request/response (raw API shape for serde) ---

#[derive(Serialize)]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
    #[serde(rename = "includeValues")]
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Option<Vec<Match>>,
}

/// One scored match, ranked by relevance by the index.
#[derive(Debug, Clone, Deserialize)]
pub struct Match {
    pub score: Option<f32>,
    pub metadata: Option<MatchMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchMetadata {
    pub text: Option<String>,
}

/// Per-index stats; only the namespace set matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStats {
    #[serde(default)]
    pub namespaces: HashMap<String, Value>,
}

// --- Client ---

/// HTTP vector-index provider.
pub struct VectorIndex {
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl VectorIndex {
    pub fn new(api_base: &str, api_key: &str) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RetrievalError::Config(format!("reqwest client: {e}")))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// True when the named index exists. A 404 is the defined "no such
    /// index" signal, not an error.
    pub async fn has_index(&self, name: &str) -> Result<bool, RetrievalError> {
        let url = format!("{}/indexes/{}", self.api_base, name);
        let res = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !res.status().is_success() {
            return Err(RetrievalError::Http(format!(
                "index describe returned {}",
                res.status()
            )));
        }
        Ok(true)
    }

    /// Namespace stats for the named index.
    pub async fn describe_stats(&self, name: &str) -> Result<IndexStats, RetrievalError> {
        let url = format!("{}/indexes/{}/describe_index_stats", self.api_base, name);
        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;
        if !res.status().is_success() {
            return Err(RetrievalError::Http(format!(
                "describe_index_stats returned {}",
                res.status()
            )));
        }
        let text = res
            .text()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| RetrievalError::Parse(e.to_string()))
    }

    /// Top-k metadata-only query against one namespace. Matches come back in
    /// the index's relevance order.
    pub async fn query(
        &self,
        name: &str,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Match>, RetrievalError> {
        let url = format!("{}/indexes/{}/query", self.api_base, name);
        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;
        if !res.status().is_success() {
            return Err(RetrievalError::Http(format!(
                "query returned {}",
                res.status()
            )));
        }
        let text = res
            .text()
            .await
            .map_err(|e| RetrievalError::Http(e.to_string()))?;
        let parsed: QueryResponse =
            serde_json::from_str(&text).map_err(|e| RetrievalError::Parse(e.to_string()))?;
        Ok(parsed.matches.unwrap_or_default())
    }
}
