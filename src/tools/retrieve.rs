//! `retrieve` tool: embed the query, search the vector index, concatenate
//! the matched text in relevance order.
//!
//! "No results" (missing index, missing namespace, zero matches) is a
//! defined null outcome, distinct from an error.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::retrieval::{Embedder, VectorIndex};
use crate::tools::context::ToolCtx;
use crate::tools::descriptor::{ParamKind, ParamSpec};
use crate::tools::error::ToolError;
use crate::tools::registry::{BoxFuture, RegistryError, Tool, ToolRegistry};

/// Matches requested per query, metadata only.
const TOP_K: usize = 5;

const PARAMS: &[ParamSpec] = &[ParamSpec::required("query", ParamKind::String)];

/// Retrieval over an external embedder + vector index.
pub struct Retrieve {
    embedder: Arc<Embedder>,
    index: Arc<VectorIndex>,
    index_name: String,
    namespace: String,
}

impl Retrieve {
    pub fn new(
        embedder: Arc<Embedder>,
        index: Arc<VectorIndex>,
        index_name: &str,
        namespace: &str,
    ) -> Self {
        Self {
            embedder,
            index,
            index_name: index_name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl Tool for Retrieve {
    fn name(&self) -> &str {
        "retrieve"
    }

    fn description(&self) -> &str {
        "Retrieve passages relevant to a query from the indexed document collection"
    }

    fn tags(&self) -> &[&str] {
        &["rag", "retrieval"]
    }

    fn params(&self) -> &[ParamSpec] {
        PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let query = args
                .get("query")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::Internal("missing coerced argument 'query'".to_string()))?;

            ctx.debug("embedding query", &json!({ "query": query }));
            let vector = self.embedder.embed(query).await?;

            if !self.index.has_index(&self.index_name).await? {
                ctx.info("index not found, no results", &json!({ "index": &self.index_name }));
                return Ok(Value::Null);
            }

            let stats = self.index.describe_stats(&self.index_name).await?;
            if !stats.namespaces.contains_key(&self.namespace) {
                ctx.info(
                    "namespace not found, no results",
                    &json!({ "index": &self.index_name, "namespace": &self.namespace }),
                );
                return Ok(Value::Null);
            }

            let matches = self
                .index
                .query(&self.index_name, &self.namespace, &vector, TOP_K)
                .await?;
            let text = matches
                .iter()
                .filter_map(|m| m.metadata.as_ref().and_then(|md| md.text.as_deref()))
                .collect::<Vec<_>>()
                .join("\n\n");
            if text.is_empty() {
                ctx.info("no matches", &json!({ "namespace": &self.namespace }));
                return Ok(Value::Null);
            }

            ctx.info(
                "retrieval complete",
                &json!({ "matches": matches.len(), "chars": text.len() }),
            );
            Ok(Value::String(text))
        })
    }
}

/// Register the retrieval tool group.
pub fn register(
    registry: &ToolRegistry,
    embedder: Arc<Embedder>,
    index: Arc<VectorIndex>,
    index_name: &str,
    namespace: &str,
) -> Result<(), RegistryError> {
    registry.register(Retrieve::new(embedder, index, index_name, namespace))?;
    tracing::info!("registered retrieval tools");
    Ok(())
}
