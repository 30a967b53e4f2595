//! Tool trait and registry: register by name (strict uniqueness), lookup, list.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::tools::context::ToolCtx;
use crate::tools::descriptor::{ParamDescriptor, ParamSpec, ToolDescriptor};
use crate::tools::error::ToolError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single tool: name, description, tags, parameter spec, and execute.
///
/// Every tool conforms to this one shape regardless of arity or argument
/// types; `args` is the argument object already validated and coerced by the
/// dispatcher against [`Tool::params`].
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[&str] {
        &[]
    }
    fn params(&self) -> &[ParamSpec];
    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>>;
}

/// Serialized descriptor for one tool (discovery shape).
pub fn descriptor_of(tool: &dyn Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        tags: tool.tags().iter().map(|t| t.to_string()).collect(),
        params: tool.params().iter().map(ParamDescriptor::from_spec).collect(),
    }
}

/// Registration failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Duplicate names are rejected, never silently replaced.
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),
}

/// Registry of tools by name. Populated single-threaded at startup, read-only
/// afterwards; the inner lock is never contended once the server is serving.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    by_name: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, for discovery listings.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its name. A second tool with the same name fails
    /// with [`RegistryError::DuplicateName`].
    pub fn register<T: Tool + 'static>(&self, tool: T) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        let mut inner = self.inner.write().expect("registry lock");
        if inner.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        tracing::info!(tool = %name, "registered tool");
        inner.order.push(name.clone());
        inner.by_name.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let inner = self.inner.read().expect("registry lock");
        inner.by_name.get(name).cloned()
    }

    /// Descriptors of all registered tools, in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let inner = self.inner.read().expect("registry lock");
        inner
            .order
            .iter()
            .filter_map(|name| inner.by_name.get(name))
            .map(|tool| descriptor_of(tool.as_ref()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("registry lock").order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
