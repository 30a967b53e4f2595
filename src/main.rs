//! toolhub — RPC tool server: arithmetic, a persisted task list, and
//! document retrieval behind one registration and invocation contract.
//!
//! Single binary: composes the tool registry and serves it over HTTP.
//! Config: `./toolhub.toml` or `$TOOLHUB_CONFIG`; env overrides for secrets.

use std::sync::Arc;

use toolhub::config;
use toolhub::retrieval::{Embedder, VectorIndex};
use toolhub::server::{self, AppState};
use toolhub::store::TaskStore;
use toolhub::tools::{self, Dispatcher};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    eprintln!("toolhub {}", env!("CARGO_PKG_VERSION"));

    let path = config::default_config_path();
    let cfg = match config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let verified_email = match cfg.verified_email() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    let retrieval = match cfg.retrieval_settings() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let store_path = cfg.store_path();
    let store = match TaskStore::open(&store_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("store: {}", e);
            std::process::exit(1);
        }
    };
    eprintln!("task store: {}", store_path.display());

    let embedder = match Embedder::new(
        &retrieval.embed_api_base,
        &retrieval.embed_api_key,
        &retrieval.embed_model,
    ) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            eprintln!("embedder: {}", e);
            std::process::exit(1);
        }
    };
    let index = match VectorIndex::new(&retrieval.index_api_base, &retrieval.index_api_key) {
        Ok(i) => Arc::new(i),
        Err(e) => {
            eprintln!("vector index: {}", e);
            std::process::exit(1);
        }
    };

    let registry = match tools::build_registry(
        store,
        &verified_email,
        embedder,
        index,
        &retrieval.index_name,
        &retrieval.namespace,
    ) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            eprintln!("registry: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(registry)),
    };
    if let Err(e) = server::serve(cfg.host(), cfg.port(), state).await {
        eprintln!("server: {}", e);
        std::process::exit(1);
    }
}
