//! Runtime value types
//!
//! `Val` is the tagged payload exchanged across suspension boundaries: what a
//! resumed computation receives, what a task completes with, and what external
//! operations deliver through continuations. Representing the payload as a
//! closed variant set keeps the suspend/resume channel statically checkable
//! while still carrying arbitrary structured data.

use crate::errors::FaultInfo;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
    /// Error value with code and message
    Fault(FaultInfo),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Bool(b) => *b,
            Val::Null => false,
            _ => true,
        }
    }

    pub fn str(s: impl Into<String>) -> Self {
        Val::Str(s.into())
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Self {
        Val::Num(n as f64)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

/// Convert a plain JSON value into a runtime value.
pub fn json_to_val(json: &JsonValue) -> Result<Val> {
    let val = match json {
        JsonValue::Null => Val::Null,
        JsonValue::Bool(b) => Val::Bool(*b),
        JsonValue::Number(n) => {
            let n = n
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("Number not representable as f64: {}", n))?;
            Val::Num(n)
        }
        JsonValue::String(s) => Val::Str(s.clone()),
        JsonValue::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                list.push(json_to_val(item)?);
            }
            Val::List(list)
        }
        JsonValue::Object(fields) => {
            let mut obj = HashMap::with_capacity(fields.len());
            for (key, value) in fields {
                obj.insert(key.clone(), json_to_val(value)?);
            }
            Val::Obj(obj)
        }
    };

    Ok(val)
}

/// Convert a runtime value back to plain JSON. Fault values become objects
/// with `code` and `message` fields.
pub fn val_to_json(val: &Val) -> Result<JsonValue> {
    let json = match val {
        Val::Null => JsonValue::Null,
        Val::Bool(b) => JsonValue::Bool(*b),
        Val::Num(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| anyhow::anyhow!("Number not representable in JSON: {}", n))?,
        Val::Str(s) => JsonValue::String(s.clone()),
        Val::List(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                list.push(val_to_json(item)?);
            }
            JsonValue::Array(list)
        }
        Val::Obj(fields) => {
            let mut obj = serde_json::Map::with_capacity(fields.len());
            for (key, value) in fields {
                obj.insert(key.clone(), val_to_json(value)?);
            }
            JsonValue::Object(obj)
        }
        Val::Fault(info) => serde_json::json!({
            "code": info.code,
            "message": info.message,
        }),
    };

    Ok(json)
}
