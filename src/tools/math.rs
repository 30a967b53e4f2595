//! Arithmetic tools: add, subtract, multiply, divide, power, factorial.

use serde_json::{json, Value};

use crate::tools::context::ToolCtx;
use crate::tools::descriptor::{ParamKind, ParamSpec};
use crate::tools::error::ToolError;
use crate::tools::registry::{BoxFuture, RegistryError, Tool, ToolRegistry};

const TAGS: &[&str] = &["calculation", "math"];

const BINARY_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("a", ParamKind::Number),
    ParamSpec::required("b", ParamKind::Number),
];

const FACTORIAL_PARAMS: &[ParamSpec] = &[ParamSpec::required("n", ParamKind::Integer)];

/// Warn above this input; the result is large but still computed.
const FACTORIAL_WARN_THRESHOLD: i64 = 20;

fn num(args: &Value, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::Internal(format!("missing coerced argument '{key}'")))
}

fn int(args: &Value, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::Internal(format!("missing coerced argument '{key}'")))
}

pub struct Add;

impl Tool for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        BINARY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let a = num(args, "a")?;
            let b = num(args, "b")?;
            ctx.debug("starting addition", &json!({ "a": a, "b": b }));
            let result = a + b;
            ctx.info("addition complete", &json!({ "a": a, "b": b, "result": result }));
            Ok(json!(result))
        })
    }
}

pub struct Subtract;

impl Tool for Subtract {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtract b from a"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        BINARY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let a = num(args, "a")?;
            let b = num(args, "b")?;
            ctx.debug("starting subtraction", &json!({ "a": a, "b": b }));
            let result = a - b;
            ctx.info(
                "subtraction complete",
                &json!({ "a": a, "b": b, "result": result }),
            );
            Ok(json!(result))
        })
    }
}

pub struct Multiply;

impl Tool for Multiply {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply two numbers"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        BINARY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let a = num(args, "a")?;
            let b = num(args, "b")?;
            ctx.debug("starting multiplication", &json!({ "a": a, "b": b }));
            let result = a * b;
            ctx.info(
                "multiplication complete",
                &json!({ "a": a, "b": b, "result": result }),
            );
            Ok(json!(result))
        })
    }
}

pub struct Divide;

impl Tool for Divide {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divide a by b"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        BINARY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let a = num(args, "a")?;
            let b = num(args, "b")?;
            ctx.debug("starting division", &json!({ "a": a, "b": b }));
            if b == 0.0 {
                ctx.error("division by zero attempted", &json!({ "a": a, "b": b }));
                return Err(ToolError::DivisionByZero);
            }
            let result = a / b;
            ctx.info(
                "division complete",
                &json!({ "a": a, "b": b, "result": result }),
            );
            Ok(json!(result))
        })
    }
}

pub struct Power;

impl Tool for Power {
    fn name(&self) -> &str {
        "power"
    }

    fn description(&self) -> &str {
        "a raised to the power of b"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        BINARY_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let a = num(args, "a")?;
            let b = num(args, "b")?;
            ctx.debug("starting power calculation", &json!({ "base": a, "exponent": b }));
            let result = a.powf(b);
            if !result.is_finite() {
                ctx.error(
                    "power calculation out of range",
                    &json!({ "base": a, "exponent": b }),
                );
                return Err(ToolError::InvalidArgument(
                    "power result out of numeric range".to_string(),
                ));
            }
            ctx.info(
                "power calculation complete",
                &json!({ "base": a, "exponent": b, "result": result }),
            );
            Ok(json!(result))
        })
    }
}

pub struct Factorial;

impl Tool for Factorial {
    fn name(&self) -> &str {
        "factorial"
    }

    fn description(&self) -> &str {
        "Factorial of a number"
    }

    fn tags(&self) -> &[&str] {
        TAGS
    }

    fn params(&self) -> &[ParamSpec] {
        FACTORIAL_PARAMS
    }

    fn execute<'a>(
        &'a self,
        ctx: &'a ToolCtx,
        args: &'a Value,
    ) -> BoxFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let n = int(args, "n")?;
            ctx.debug("starting factorial calculation", &json!({ "n": n }));
            if n < 0 {
                ctx.error("factorial of negative number rejected", &json!({ "n": n }));
                return Err(ToolError::InvalidArgument(
                    "factorial is not defined for negative numbers".to_string(),
                ));
            }
            if n > FACTORIAL_WARN_THRESHOLD {
                ctx.warn("large factorial calculation", &json!({ "n": n }));
            }
            let result = factorial(n as u64).ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "factorial({n}) overflows the supported range"
                ))
            })?;
            // values beyond u64 keep exactness as decimal strings
            let payload = match u64::try_from(result) {
                Ok(small) => json!(small),
                Err(_) => json!(result.to_string()),
            };
            ctx.info(
                "factorial complete",
                &json!({ "n": n, "result": result.to_string() }),
            );
            Ok(payload)
        })
    }
}

fn factorial(n: u64) -> Option<u128> {
    let mut acc: u128 = 1;
    for k in 2..=u128::from(n) {
        acc = acc.checked_mul(k)?;
    }
    Some(acc)
}

/// Register the arithmetic tool group.
pub fn register(registry: &ToolRegistry) -> Result<(), RegistryError> {
    registry.register(Add)?;
    registry.register(Subtract)?;
    registry.register(Multiply)?;
    registry.register(Divide)?;
    registry.register(Power)?;
    registry.register(Factorial)?;
    tracing::info!("registered math tools");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str) -> ToolCtx {
        ToolCtx::new(name)
    }

    #[tokio::test]
    async fn divide_by_zero_is_classified() {
        let err = Divide
            .execute(&ctx("divide"), &json!({ "a": 10.0, "b": 0.0 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::DivisionByZero));

        let out = Divide
            .execute(&ctx("divide"), &json!({ "a": 10.0, "b": 2.0 }))
            .await
            .unwrap();
        assert_eq!(out, json!(5.0));
    }

    #[tokio::test]
    async fn factorial_edges() {
        let err = Factorial
            .execute(&ctx("factorial"), &json!({ "n": -1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));

        let out = Factorial
            .execute(&ctx("factorial"), &json!({ "n": 5 }))
            .await
            .unwrap();
        assert_eq!(out, json!(120));

        // beyond the warn threshold still succeeds
        let out = Factorial
            .execute(&ctx("factorial"), &json!({ "n": 21 }))
            .await
            .unwrap();
        assert_eq!(out, json!("51090942171709440000"));
    }

    #[tokio::test]
    async fn power_and_add() {
        let out = Power
            .execute(&ctx("power"), &json!({ "a": 2.0, "b": 10.0 }))
            .await
            .unwrap();
        assert_eq!(out, json!(1024.0));

        let out = Add
            .execute(&ctx("add"), &json!({ "a": 1.5, "b": 2.25 }))
            .await
            .unwrap();
        assert_eq!(out, json!(3.75));
    }
}
