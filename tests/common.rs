use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use toolhub::retrieval::{Embedder, VectorIndex};
use toolhub::store::TaskStore;
use toolhub::tools::{self, Dispatcher};

pub const TEST_EMAIL: &str = "owner@example.com";
pub const TEST_INDEX: &str = "docs";
pub const TEST_NAMESPACE: &str = "survey";

pub struct TestStore {
    // Keep TempDir alive so the database isn't deleted until struct drop
    _tmp: TempDir,
    pub store: Arc<TaskStore>,
}

impl TestStore {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let store = TaskStore::open(&tmp.path().join("tasks.db")).expect("open store");
        Self {
            _tmp: tmp,
            store: Arc::new(store),
        }
    }
}

pub struct MockRetrieval {
    pub server: MockServer,
}

impl MockRetrieval {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn endpoint(&self) -> String {
        self.server.uri()
    }

    /// Mount /embeddings returning a fixed short vector.
    pub async fn mock_embeddings(&self) {
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [ { "embedding": [0.1, 0.2, 0.3] } ]
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_embeddings_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_index_exists(&self, exists: bool) {
        let status = if exists { 200 } else { 404 };
        Mock::given(method("GET"))
            .and(path(format!("/indexes/{TEST_INDEX}")))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "name": TEST_INDEX })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_stats(&self, namespaces: &[&str]) {
        let map: serde_json::Map<String, serde_json::Value> = namespaces
            .iter()
            .map(|n| (n.to_string(), serde_json::json!({ "vectorCount": 10 })))
            .collect();
        Mock::given(method("POST"))
            .and(path(format!("/indexes/{TEST_INDEX}/describe_index_stats")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "namespaces": map })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_query(&self, texts: &[&str]) {
        let matches: Vec<serde_json::Value> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                serde_json::json!({
                    "score": 0.9 - (i as f64) * 0.1,
                    "metadata": { "text": t }
                })
            })
            .collect();
        Mock::given(method("POST"))
            .and(path(format!("/indexes/{TEST_INDEX}/query")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "matches": matches })),
            )
            .mount(&self.server)
            .await;
    }
}

/// Full registry + dispatcher wired against the given store and a mock
/// retrieval endpoint.
pub fn build_dispatcher(store: Arc<TaskStore>, retrieval_endpoint: &str) -> Dispatcher {
    let embedder =
        Arc::new(Embedder::new(retrieval_endpoint, "test-key", "test-embed").expect("embedder"));
    let index = Arc::new(VectorIndex::new(retrieval_endpoint, "test-key").expect("vector index"));
    let registry = tools::build_registry(
        store,
        TEST_EMAIL,
        embedder,
        index,
        TEST_INDEX,
        TEST_NAMESPACE,
    )
    .expect("registry");
    Dispatcher::new(Arc::new(registry))
}
