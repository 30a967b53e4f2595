//! Retrieval collaborators: embedding client and vector-index client.
//!
//! Both are narrow HTTP clients; the `retrieve` tool composes them. Error
//! messages never include credentials or response bodies.

pub mod embed;
pub mod vector;

pub use embed::Embedder;
pub use vector::{IndexStats, Match, VectorIndex};

/// Retrieval collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("retrieval config: {0}")]
    Config(String),
    #[error("retrieval http: {0}")]
    Http(String),
    #[error("retrieval parse: {0}")]
    Parse(String),
}
