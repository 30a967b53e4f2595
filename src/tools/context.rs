//! Per-invocation context: correlation id + structured logging.

use serde_json::Value;
use uuid::Uuid;

/// Context passed into each tool execution. Created fresh per inbound call
/// and never shared across calls; every log line it emits carries the same
/// correlation id so one invocation can be traced end to end.
#[derive(Debug, Clone)]
pub struct ToolCtx {
    /// Correlation id for this invocation (UUID v4).
    pub call_id: String,
    /// Name of the tool being invoked.
    pub tool: String,
}

impl ToolCtx {
    pub fn new(tool: &str) -> Self {
        Self {
            call_id: Uuid::new_v4().to_string(),
            tool: tool.to_string(),
        }
    }

    pub fn debug(&self, msg: &str, fields: &Value) {
        tracing::debug!(call_id = %self.call_id, tool = %self.tool, fields = %fields, "{}", msg);
    }

    pub fn info(&self, msg: &str, fields: &Value) {
        tracing::info!(call_id = %self.call_id, tool = %self.tool, fields = %fields, "{}", msg);
    }

    pub fn warn(&self, msg: &str, fields: &Value) {
        tracing::warn!(call_id = %self.call_id, tool = %self.tool, fields = %fields, "{}", msg);
    }

    pub fn error(&self, msg: &str, fields: &Value) {
        tracing::error!(call_id = %self.call_id, tool = %self.tool, fields = %fields, "{}", msg);
    }
}
