//! Dispatcher: resolve a tool by name, validate and coerce arguments against
//! its parameter spec, invoke the handler, and normalize the outcome into the
//! result envelope. No failure leaves this layer unclassified.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::tools::context::ToolCtx;
use crate::tools::descriptor::{ParamKind, ParamSpec};
use crate::tools::envelope::Envelope;
use crate::tools::error::ToolError;
use crate::tools::registry::ToolRegistry;

/// Dispatches invocations against a populated registry. No cross-call state;
/// each invocation gets a fresh [`ToolCtx`] and runs independently.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke `name` with a raw argument object. Always returns an envelope;
    /// handler failures are converted, never propagated.
    pub async fn invoke(&self, name: &str, raw_args: &Value) -> Envelope {
        let ctx = ToolCtx::new(name);

        let tool = match self.registry.lookup(name) {
            Some(tool) => tool,
            None => {
                let err = ToolError::UnknownTool(name.to_string());
                ctx.error("no such tool registered", &Value::Null);
                return Envelope::from_error(&err);
            }
        };

        let args = match validate_args(tool.params(), raw_args) {
            Ok(map) => Value::Object(map),
            Err(e) => {
                ctx.error(
                    "argument validation failed",
                    &serde_json::json!({ "error": e.to_string() }),
                );
                return Envelope::from_error(&e);
            }
        };

        ctx.debug("invoking tool", &args);
        match tool.execute(&ctx, &args).await {
            Ok(payload) => {
                ctx.info("tool completed", &serde_json::json!({ "result": &payload }));
                Envelope::success(payload)
            }
            Err(e) => {
                ctx.error("tool failed", &serde_json::json!({ "error": e.to_string() }));
                Envelope::from_error(&e)
            }
        }
    }
}

/// Absent, null, and blank-string values all count as missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Validate and coerce raw arguments against a tool's parameter spec.
///
/// Missing required fields are collected exhaustively and reported together;
/// value validation then runs in declaration order and stops at the first
/// invalid value. Arguments not named in the spec are dropped.
pub fn validate_args(
    params: &[ParamSpec],
    raw: &Value,
) -> Result<Map<String, Value>, ToolError> {
    let empty = Map::new();
    let raw = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => {
            return Err(ToolError::InvalidArgument(
                "arguments must be a JSON object".to_string(),
            ))
        }
    };

    let missing: Vec<String> = params
        .iter()
        .filter(|p| p.required && is_missing(raw.get(p.name)))
        .map(|p| p.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::MissingFields(missing));
    }

    let mut out = Map::new();
    for param in params {
        let value = match raw.get(param.name) {
            None | Some(Value::Null) => continue,
            Some(v) => v,
        };
        // optional blank strings are treated as absent, same as the required check
        if let Value::String(s) = value {
            if s.trim().is_empty() {
                continue;
            }
        }
        out.insert(param.name.to_string(), coerce(param, value)?);
    }
    Ok(out)
}

fn coerce(param: &ParamSpec, value: &Value) -> Result<Value, ToolError> {
    match param.kind {
        ParamKind::String => match value.as_str() {
            Some(s) => Ok(Value::String(s.to_string())),
            None => Err(invalid(param, "must be a string")),
        },
        ParamKind::Number => {
            let parsed = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
                _ => None,
            };
            match parsed {
                Some(f) => Ok(Value::from(f)),
                None => Err(invalid(param, "must be a number")),
            }
        }
        ParamKind::Integer => {
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match parsed {
                Some(i) => Ok(Value::from(i)),
                None => Err(invalid(param, "must be an integer")),
            }
        }
        ParamKind::Date => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid(param, "must be a YYYY-MM-DD date string"))?;
            let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                ToolError::InvalidArgument(format!(
                    "invalid date format for '{}', use YYYY-MM-DD",
                    param.name
                ))
            })?;
            Ok(Value::String(date.format("%Y-%m-%d").to_string()))
        }
        ParamKind::Enum(allowed) => {
            let s = value.as_str().ok_or_else(|| invalid(param, "must be a string"))?;
            if allowed.contains(&s) {
                Ok(Value::String(s.to_string()))
            } else {
                Err(ToolError::InvalidArgument(format!(
                    "invalid {}, allowed values: {}",
                    param.name,
                    allowed.join(", ")
                )))
            }
        }
    }
}

fn invalid(param: &ParamSpec, why: &str) -> ToolError {
    ToolError::InvalidArgument(format!("'{}' {}", param.name, why))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PARAMS: &[ParamSpec] = &[
        ParamSpec::required("title", ParamKind::String),
        ParamSpec::required("created_date", ParamKind::Date),
        ParamSpec::required("priority", ParamKind::Enum(&["low", "medium", "high"])),
        ParamSpec::optional("count", ParamKind::Integer),
    ];

    #[test]
    fn all_missing_required_fields_are_reported_together() {
        let err = validate_args(PARAMS, &json!({ "title": "  " })).unwrap_err();
        match err {
            ToolError::MissingFields(fields) => {
                assert_eq!(fields, vec!["title", "created_date", "priority"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn missing_check_runs_before_value_validation() {
        // created_date is malformed AND priority is missing: the missing set wins
        let err = validate_args(
            PARAMS,
            &json!({ "title": "x", "created_date": "not-a-date" }),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::MissingFields(_)));
    }

    #[test]
    fn bad_date_is_invalid_argument() {
        let err = validate_args(
            PARAMS,
            &json!({ "title": "x", "created_date": "2024-13-40", "priority": "low" }),
        )
        .unwrap_err();
        match err {
            ToolError::InvalidArgument(msg) => assert!(msg.contains("YYYY-MM-DD")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn enum_membership_is_enforced() {
        let err = validate_args(
            PARAMS,
            &json!({ "title": "x", "created_date": "2024-01-05", "priority": "urgent" }),
        )
        .unwrap_err();
        match err {
            ToolError::InvalidArgument(msg) => {
                assert!(msg.contains("priority"));
                assert!(msg.contains("low, medium, high"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn values_are_coerced_and_extras_dropped() {
        let out = validate_args(
            PARAMS,
            &json!({
                "title": "x",
                "created_date": "2024-01-05",
                "priority": "low",
                "count": "12",
                "unknown": true
            }),
        )
        .unwrap();
        assert_eq!(out["count"], json!(12));
        assert!(out.get("unknown").is_none());
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let err = validate_args(
            PARAMS,
            &json!({
                "title": "x",
                "created_date": "2024-01-05",
                "priority": "low",
                "count": 1.5
            }),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
    }

    #[test]
    fn null_arguments_object_is_an_empty_bag() {
        let err = validate_args(PARAMS, &Value::Null).unwrap_err();
        assert!(matches!(err, ToolError::MissingFields(_)));

        let out = validate_args(&[], &Value::Null).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate_args(PARAMS, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
    }
}
