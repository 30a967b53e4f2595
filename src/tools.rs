//! Tool framework and tool modules: registry, dispatcher, invocation
//! context, envelope, and the math/tasks/retrieval groups.

pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod math;
pub mod registry;
pub mod retrieve;
pub mod tasks;

pub use context::ToolCtx;
pub use descriptor::{ParamKind, ParamSpec, ToolDescriptor};
pub use dispatch::Dispatcher;
pub use envelope::Envelope;
pub use error::ToolError;
pub use registry::{BoxFuture, RegistryError, Tool, ToolRegistry};

use std::sync::Arc;

use crate::retrieval::{Embedder, VectorIndex};
use crate::store::TaskStore;

/// Compose the full registry: math, tasks, retrieval.
///
/// Registration runs single-threaded at startup; the registry is treated as
/// read-only once this returns.
pub fn build_registry(
    store: Arc<TaskStore>,
    authorized_email: &str,
    embedder: Arc<Embedder>,
    index: Arc<VectorIndex>,
    index_name: &str,
    namespace: &str,
) -> Result<ToolRegistry, RegistryError> {
    let registry = ToolRegistry::new();
    math::register(&registry)?;
    tasks::register(&registry, store, authorized_email)?;
    retrieve::register(&registry, embedder, index, index_name, namespace)?;
    tracing::info!(tools = registry.len(), "tool registry ready");
    Ok(registry)
}
