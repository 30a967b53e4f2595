//! Uniform result envelope: the `{"status": ...}` shape returned from every
//! invocation, success or failure.

use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use crate::tools::error::ToolError;

/// Normalized outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Handler returned a payload. Object payloads are flattened next to the
    /// status field; anything else (including null) lands under `result`.
    Success(Value),
    Error { message: String },
    /// Task-specific variant for record-not-found.
    NotFound { message: String },
}

impl Envelope {
    pub fn success(payload: Value) -> Self {
        Envelope::Success(payload)
    }

    pub fn from_error(err: &ToolError) -> Self {
        match err {
            ToolError::NotFound(msg) => Envelope::NotFound {
                message: msg.clone(),
            },
            other => Envelope::Error {
                message: other.to_string(),
            },
        }
    }

    pub fn from_result(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Envelope::Success(payload),
            Err(e) => Envelope::from_error(&e),
        }
    }

    /// The wire shape.
    pub fn to_value(&self) -> Value {
        match self {
            Envelope::Success(payload) => match payload {
                Value::Object(map) => {
                    let mut out = serde_json::Map::with_capacity(map.len() + 1);
                    out.insert("status".to_string(), Value::String("success".to_string()));
                    for (k, v) in map {
                        // a payload key never displaces the status field
                        out.entry(k.clone()).or_insert_with(|| v.clone());
                    }
                    Value::Object(out)
                }
                other => serde_json::json!({ "status": "success", "result": other }),
            },
            Envelope::Error { message } => {
                serde_json::json!({ "status": "error", "message": message })
            }
            Envelope::NotFound { message } => {
                serde_json::json!({ "status": "not_found", "message": message })
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_payload_is_flattened() {
        let v = Envelope::success(json!({ "id": 7, "message": "ok" })).to_value();
        assert_eq!(v["status"], "success");
        assert_eq!(v["id"], 7);
        assert_eq!(v["message"], "ok");
    }

    #[test]
    fn scalar_and_null_payloads_land_under_result() {
        let v = Envelope::success(json!(120)).to_value();
        assert_eq!(v["status"], "success");
        assert_eq!(v["result"], 120);

        let v = Envelope::success(Value::Null).to_value();
        assert_eq!(v["status"], "success");
        assert!(v["result"].is_null());
    }

    #[test]
    fn not_found_gets_its_own_status() {
        let v = Envelope::from_error(&ToolError::NotFound("no task found with that id".into()))
            .to_value();
        assert_eq!(v["status"], "not_found");
        assert_eq!(v["message"], "no task found with that id");
    }

    #[test]
    fn other_errors_map_to_error_status() {
        let v = Envelope::from_error(&ToolError::DivisionByZero).to_value();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "division by zero is not allowed");
    }
}
