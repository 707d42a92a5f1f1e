//! Answer-shape validation and coercion.
//!
//! A format hint is a small declarative descriptor of the value a caller
//! expects back:
//!
//! - `int` / `float`
//! - `{field:type, ...}` for a single object
//! - `list[{field:type, ...}]` for a list of such objects
//!
//! Field types are `str`, `int`, `float` and `bool` (with a few spelled-out
//! aliases). [`validate_and_coerce`] never mutates its input: on failure the
//! original value comes back untouched alongside `false`.
//!
//! Hints outside this vocabulary are accepted as-is and reported valid. That
//! leniency is intentional: an unknown hint says nothing about the shape, so
//! there is nothing to check the value against and nothing is discarded.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?(?:\d+(?:\.\d+)?|\.\d+)").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
}

impl FieldType {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "str" | "string" | "text" => Some(FieldType::Str),
            "int" | "integer" => Some(FieldType::Int),
            "float" | "number" | "double" => Some(FieldType::Float),
            "bool" | "boolean" => Some(FieldType::Bool),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatHint {
    Int,
    Float,
    Object(Vec<(String, FieldType)>),
    ListOf(Vec<(String, FieldType)>),
    Unrecognized(String),
}

impl FormatHint {
    pub fn parse(hint: &str) -> Self {
        let trimmed = hint.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "int" | "integer" => return FormatHint::Int,
            "float" | "number" | "double" => return FormatHint::Float,
            _ => {}
        }
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("list[") && trimmed.ends_with(']') {
            if let Some(fields) = parse_object_descriptor(&trimmed[5..trimmed.len() - 1]) {
                return FormatHint::ListOf(fields);
            }
        } else if let Some(fields) = parse_object_descriptor(trimmed) {
            return FormatHint::Object(fields);
        }
        FormatHint::Unrecognized(trimmed.to_string())
    }
}

fn parse_object_descriptor(s: &str) -> Option<Vec<(String, FieldType)>> {
    let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut fields = Vec::new();
    for part in inner.split(',') {
        let (name, ty) = part.split_once(':')?;
        let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
        if name.is_empty() {
            return None;
        }
        fields.push((name.to_string(), FieldType::parse(ty)?));
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Check `raw` against `format_hint`, coercing it to the declared type.
pub fn validate_and_coerce(raw: &Value, format_hint: &str) -> (bool, Value) {
    let coerced = match FormatHint::parse(format_hint) {
        FormatHint::Int => coerce_int(raw).map(Value::from),
        FormatHint::Float => coerce_float(raw).and_then(float_value),
        FormatHint::Object(fields) => coerce_object(raw, &fields),
        FormatHint::ListOf(fields) => coerce_list(raw, &fields),
        FormatHint::Unrecognized(_) => Some(raw.clone()),
    };
    match coerced {
        Some(value) => (true, value),
        None => (false, raw.clone()),
    }
}

/// Interpret generated answer text: strict JSON when it parses, otherwise the
/// trimmed text itself.
pub fn answer_value_from_text(text: &str) -> Value {
    let trimmed = text.trim();
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => int_from_number(n),
        Value::String(s) => DIGIT_RUN.find(s)?.as_str().parse().ok(),
        _ => None,
    }
}

fn int_from_number(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?.trunc();
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn coerce_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => DECIMAL.find(s)?.as_str().parse().ok(),
        _ => None,
    }
}

fn float_value(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

fn coerce_object(raw: &Value, fields: &[(String, FieldType)]) -> Option<Value> {
    let parsed;
    let obj = match raw {
        Value::Object(map) => map,
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s.trim()).ok()?;
            parsed.as_object()?
        }
        _ => return None,
    };
    let mut out = Map::new();
    for (name, ty) in fields {
        let value = obj.get(name)?;
        let coerced = match (ty, value) {
            (FieldType::Str, Value::String(_)) | (FieldType::Bool, Value::Bool(_)) => value.clone(),
            (FieldType::Int, Value::Number(n)) => Value::from(int_from_number(n)?),
            (FieldType::Float, Value::Number(n)) => float_value(n.as_f64()?)?,
            _ => return None,
        };
        out.insert(name.clone(), coerced);
    }
    Some(Value::Object(out))
}

fn coerce_list(raw: &Value, fields: &[(String, FieldType)]) -> Option<Value> {
    let parsed;
    let items = match raw {
        Value::Array(items) => items,
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s.trim()).ok()?;
            parsed.as_array()?
        }
        _ => return None,
    };
    items
        .iter()
        .map(|item| coerce_object(item, fields))
        .collect::<Option<Vec<_>>>()
        .map(Value::Array)
}
