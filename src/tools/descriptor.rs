//! Parameter specs and the serialized descriptor shape used by discovery.

use serde::Serialize;

/// Declared type of one tool parameter. Drives dispatcher-side validation
/// and coercion before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Integer,
    /// Strict `YYYY-MM-DD`; re-emitted normalized.
    Date,
    /// Membership in a fixed value set.
    Enum(&'static [&'static str]),
}

impl ParamKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Integer => "integer",
            ParamKind::Date => "date",
            ParamKind::Enum(_) => "enum",
        }
    }
}

/// One parameter of a tool: name, declared type, required flag.
/// Order within a tool's spec is the validation and display order.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Serialized tool descriptor (discovery endpoint shape).
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub params: Vec<ParamDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParamDescriptor {
    pub fn from_spec(spec: &ParamSpec) -> Self {
        let allowed = match spec.kind {
            ParamKind::Enum(values) => Some(values.iter().map(|v| v.to_string()).collect()),
            _ => None,
        };
        Self {
            name: spec.name.to_string(),
            type_: spec.kind.type_name().to_string(),
            required: spec.required,
            allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_descriptor_carries_allowed_values() {
        let spec = ParamSpec::required("priority", ParamKind::Enum(&["low", "medium", "high"]));
        let d = ParamDescriptor::from_spec(&spec);
        assert_eq!(d.type_, "enum");
        assert!(d.required);
        assert_eq!(d.allowed.as_deref(), Some(&["low".to_string(), "medium".into(), "high".into()][..]));
    }

    #[test]
    fn plain_descriptor_has_no_allowed_list() {
        let spec = ParamSpec::optional("title", ParamKind::String);
        let d = ParamDescriptor::from_spec(&spec);
        assert_eq!(d.type_, "string");
        assert!(!d.required);
        assert!(d.allowed.is_none());
    }
}
