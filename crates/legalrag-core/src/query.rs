//! Query input normalization
//!
//! Callers hand in either bare text or a JSON mapping carrying a `query`
//! field; every entry point reduces both to a trimmed-checked string.

use crate::error::{LegalRagError, Result};
use serde_json::Value;

/// A query as received from upstream callers
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    Text(String),
    Mapping(serde_json::Map<String, Value>),
}

impl QueryInput {
    /// Extract the query text without validating it
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Mapping(map) => match map.get("query") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }

    /// Extract the query text, rejecting empty or whitespace-only input
    pub fn normalize(self) -> Result<String> {
        let text = self.into_text();
        if text.trim().is_empty() {
            return Err(LegalRagError::EmptyInput);
        }
        Ok(text)
    }
}

impl From<&str> for QueryInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for QueryInput {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Value> for QueryInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Mapping(map),
            Value::String(s) => Self::Text(s),
            Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Normalize anything convertible into a query
pub fn normalize_query(input: impl Into<QueryInput>) -> Result<String> {
    input.into().normalize()
}
