//! Conversion of raw property values into requested types
//!
//! Typed reads deserialize the raw value first. Only when that fails is the
//! conversion service asked for alternative representations of the value
//! (a string `"5433"` as the number `5433`, a number as its string, ...),
//! each of which is tried in turn.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Produces alternative representations of a raw property value.
///
/// Implementations must not depend on the requested type; the resolver
/// tries every candidate against it.
pub trait ConversionService: Send + Sync {
    /// Candidate values for `raw`, most preferred first
    fn coerce(&self, raw: &Value) -> Vec<Value>;
}

/// Convert `raw` into `T` using `service` as the fallback.
///
/// On failure, returns the error message from the direct attempt.
pub fn convert<T>(service: &dyn ConversionService, raw: &Value) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let direct_error = match T::deserialize(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    service
        .coerce(raw)
        .iter()
        .find_map(|candidate| T::deserialize(candidate).ok())
        .ok_or_else(|| direct_error.to_string())
}

/// String-centric conversions matching how configuration is usually written
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConversionService;

impl DefaultConversionService {
    /// Create the default conversion service
    pub fn new() -> Self {
        Self
    }
}

impl ConversionService for DefaultConversionService {
    fn coerce(&self, raw: &Value) -> Vec<Value> {
        match raw {
            Value::String(s) => coerce_str(s),
            Value::Number(n) => vec![
                Value::String(n.to_string()),
                Value::Array(vec![raw.clone()]),
                Value::Array(vec![Value::String(n.to_string())]),
            ],
            Value::Bool(b) => vec![
                Value::String(b.to_string()),
                Value::Array(vec![raw.clone()]),
                Value::Array(vec![Value::String(b.to_string())]),
            ],
            Value::Array(items) => vec![Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => parse_scalar(s),
                        other => other.clone(),
                    })
                    .collect(),
            )],
            Value::Null | Value::Object(_) => Vec::new(),
        }
    }
}

fn coerce_str(s: &str) -> Vec<Value> {
    let trimmed = s.trim();
    let mut candidates = Vec::new();

    if trimmed.is_empty() {
        candidates.push(Value::Null);
        return candidates;
    }

    let scalar = parse_scalar(trimmed);
    if !scalar.is_string() {
        candidates.push(scalar.clone());
    }

    if ((trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}')))
        && let Ok(json) = serde_json::from_str::<Value>(trimmed)
    {
        candidates.push(json);
    }

    if trimmed.contains(',') {
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        candidates.push(Value::Array(
            parts.iter().map(|p| Value::String((*p).to_string())).collect(),
        ));
        candidates.push(Value::Array(parts.iter().map(|p| parse_scalar(p)).collect()));
    } else {
        candidates.push(Value::Array(vec![Value::String(trimmed.to_string())]));
        if !scalar.is_string() {
            candidates.push(Value::Array(vec![scalar]));
        }
    }

    if trimmed != s {
        candidates.push(Value::String(trimmed.to_string()));
    }

    candidates
}

/// Parse a scalar from text (bool, integer, float, or string)
fn parse_scalar(value: &str) -> Value {
    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(int_val) = value.parse::<i64>() {
        return Value::from(int_val);
    }
    if let Ok(uint_val) = value.parse::<u64>() {
        return Value::from(uint_val);
    }
    if let Ok(float_val) = value.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(float_val)
    {
        return Value::Number(num);
    }
    Value::String(value.to_string())
}
