use serde_json::{Map, Value};
use thiserror::Error;
use vault_rest_core::{Period, VaultError};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Backend(#[from] VaultError),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ToolError::Validation(_))
    }
}

/// Caller-supplied parameter bag for one tool call.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    args: Map<String, Value>,
}

impl Arguments {
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(args) => Ok(Self { args }),
            other => Err(ToolError::Validation(format!(
                "arguments must be an object, got {}",
                other
            ))),
        }
    }

    /// A string that must be present and non-empty.
    pub fn require_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.args.get(key) {
            None | Some(Value::Null) => Err(required(key)),
            Some(Value::String(s)) if s.is_empty() => Err(required(key)),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ToolError::Validation(format!("{} must be a string", key))),
        }
    }

    pub fn opt_bool(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.args.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| ToolError::Validation(format!("{} must be a boolean", key))),
            Some(_) => Err(ToolError::Validation(format!("{} must be a boolean", key))),
        }
    }

    /// A whole number greater than zero. Floats are truncated and numeric
    /// strings are accepted, since clients differ in how they send numbers.
    pub fn positive_int(&self, key: &str, default: u64) -> Result<u64, ToolError> {
        let value = match self.args.get(key) {
            None | Some(Value::Null) => return Ok(default),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        match value {
            Some(n) if n.trunc() >= 1.0 => Ok(n.trunc() as u64),
            Some(_) => Err(ToolError::Validation(format!(
                "{} must be greater than 0",
                key
            ))),
            None => Err(ToolError::Validation(format!("{} must be a number", key))),
        }
    }

    pub fn period(&self) -> Result<Period, ToolError> {
        self.require_str("period")?
            .parse()
            .map_err(|e: vault_rest_core::ParsePeriodError| ToolError::Validation(e.to_string()))
    }
}

fn required(key: &str) -> ToolError {
    ToolError::Validation(format!("{} is required", key))
}
