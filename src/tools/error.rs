//! Tool error taxonomy: every failure surfaced to callers is one of these.

use crate::retrieval::RetrievalError;
use crate::store::StoreError;

/// Classified invocation failures. The dispatcher converts these into the
/// result envelope; nothing else crosses the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under the requested name.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    /// One or more required fields absent or blank; all reported together.
    #[error("please provide the following required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    /// A supplied value is malformed (bad date, disallowed enum value, wrong type).
    #[error("{0}")]
    InvalidArgument(String),
    /// Caller-supplied identity does not match the configured authorized identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The referenced record does not exist. Distinct from Unauthorized.
    #[error("{0}")]
    NotFound(String),
    #[error("division by zero is not allowed")]
    DivisionByZero,
    /// Unclassified backing-store or collaborator failure, sanitized message.
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ToolError {
    fn from(e: StoreError) -> Self {
        ToolError::Internal(format!("database error: {e}"))
    }
}

impl From<RetrievalError> for ToolError {
    fn from(e: RetrievalError) -> Self {
        ToolError::Internal(e.to_string())
    }
}
