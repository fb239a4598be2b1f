//! Scalar codec: node scalars to bound values and back.
//!
//! Bound values use the `serde_json::Value` shapes serde produces for the matching Rust
//! types, so `decode` followed by `serde_path_to_error::deserialize` yields the typed field.

use serde_json::{Number, Value};

use crate::duration::{duration_from_json, duration_to_json, format_duration, parse_duration};
use crate::error::Error;
use crate::float_format::float_to_string;
use crate::node::{Scalar, ScalarKind};
use crate::parse_scalars::{parse_bool, parse_float, parse_int};
use crate::schema::Kind;

fn found(scalar: &Scalar) -> String {
    format!("`{}`", scalar.text)
}

fn int_value(v: i128) -> Value {
    match i64::try_from(v) {
        Ok(i) => Value::from(i),
        // parse_int keeps results within i64::MIN..=u64::MAX
        Err(_) => Value::from(v as u64),
    }
}

fn unknown_enum(value: &str, expected: &'static [&'static str]) -> Error {
    Error::UnknownEnumValue {
        path: crate::path::Path::root(),
        value: value.to_string(),
        expected,
        location: crate::location::Location::UNKNOWN,
    }
}

/// Decode a scalar as `kind`. Quoting does not matter: `"8080"` binds to an integer field.
///
/// Null scalars are handled by the binder before this is called.
pub(crate) fn decode(scalar: &Scalar, kind: &Kind, strict_booleans: bool) -> Result<Value, Error> {
    let text = scalar.text.as_str();
    match kind {
        Kind::Bool => parse_bool(text, strict_booleans)
            .map(Value::Bool)
            .ok_or_else(|| Error::mismatch(kind.expecting(), found(scalar))),
        Kind::Int => match parse_int(text) {
            Ok(v) => Ok(int_value(v)),
            Err(reason) if text.trim().bytes().any(|b| b.is_ascii_digit()) => Err(Error::mismatch(
                kind.expecting(),
                format!("{} ({reason})", found(scalar)),
            )),
            Err(_) => Err(Error::mismatch(kind.expecting(), found(scalar))),
        },
        Kind::Float => {
            let value = parse_float(text)
                .or_else(|| parse_int(text).ok().map(|v| v as f64))
                .ok_or_else(|| Error::mismatch(kind.expecting(), found(scalar)))?;
            Number::from_f64(value)
                .map(Value::Number)
                .ok_or_else(|| Error::mismatch("a finite float", found(scalar)))
        }
        Kind::Str => Ok(Value::String(scalar.text.clone())),
        Kind::Enum(names) => {
            if names.contains(&text) {
                Ok(Value::String(scalar.text.clone()))
            } else {
                Err(unknown_enum(text, names))
            }
        }
        Kind::Duration => parse_duration(text)
            .map(duration_to_json)
            .ok_or_else(|| Error::mismatch(kind.expecting(), found(scalar))),
        Kind::Seq(_) | Kind::Map(_, _) | Kind::Struct(_) => {
            Err(Error::mismatch(kind.expecting(), found(scalar)))
        }
        Kind::Any => Ok(decode_inferred(scalar)),
    }
}

/// Decode by the scalar's own kind. Non-finite floats stay text.
pub(crate) fn decode_inferred(scalar: &Scalar) -> Value {
    let text = scalar.text.as_str();
    match scalar.kind {
        Some(ScalarKind::Null) => Value::Null,
        Some(ScalarKind::Bool) => parse_bool(text, false)
            .map(Value::Bool)
            .unwrap_or_else(|| Value::String(scalar.text.clone())),
        Some(ScalarKind::Int) => parse_int(text)
            .map(int_value)
            .unwrap_or_else(|_| Value::String(scalar.text.clone())),
        Some(ScalarKind::Float) => parse_float(text)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(scalar.text.clone())),
        Some(ScalarKind::Str) | None => Value::String(scalar.text.clone()),
    }
}

/// Encode a bound value as a scalar of `kind`, in canonical form.
pub(crate) fn encode(value: &Value, kind: &Kind) -> Result<Scalar, Error> {
    let mismatch = || Error::mismatch(kind.expecting(), describe_value(value));
    match (kind, value) {
        (Kind::Bool, Value::Bool(b)) => Ok(Scalar::typed(b.to_string(), ScalarKind::Bool)),
        (Kind::Int, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::typed(i.to_string(), ScalarKind::Int))
            } else if let Some(u) = n.as_u64() {
                Ok(Scalar::typed(u.to_string(), ScalarKind::Int))
            } else {
                Err(mismatch())
            }
        }
        (Kind::Float, Value::Number(n)) => {
            let f = n.as_f64().ok_or_else(mismatch)?;
            Ok(Scalar::typed(float_to_string(f), ScalarKind::Float))
        }
        (Kind::Str, Value::String(s)) => Ok(Scalar::string(s.as_str())),
        (Kind::Enum(names), Value::String(s)) => {
            if names.contains(&s.as_str()) {
                Ok(Scalar::string(s.as_str()))
            } else {
                Err(unknown_enum(s, names))
            }
        }
        (Kind::Duration, _) => {
            let d = duration_from_json(value).ok_or_else(mismatch)?;
            format_duration(d).map(Scalar::string).ok_or_else(|| {
                Error::mismatch("a duration in whole milliseconds", format!("{d:?}"))
            })
        }
        (Kind::Any, Value::Bool(b)) => Ok(Scalar::typed(b.to_string(), ScalarKind::Bool)),
        (Kind::Any, Value::Number(n)) => {
            if n.is_f64() {
                encode(value, &Kind::Float)
            } else {
                Ok(Scalar::typed(n.to_string(), ScalarKind::Int))
            }
        }
        (Kind::Any, Value::String(s)) => Ok(Scalar::string(s.as_str())),
        _ => Err(mismatch()),
    }
}

/// Canonical text of a mapping key, used both as the bound object's key and to match
/// existing document keys when writing back (`0x10` and `16` are the same key).
pub(crate) fn canonical_key(key: &str, kind: &Kind) -> Result<String, Error> {
    match kind {
        Kind::Int => parse_int(key)
            .map(|v| v.to_string())
            .map_err(|_| Error::mismatch("an integer key", format!("`{key}`"))),
        Kind::Enum(names) => {
            if names.contains(&key) {
                Ok(key.to_string())
            } else {
                Err(unknown_enum(key, names))
            }
        }
        _ => Ok(key.to_string()),
    }
}

pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("`{b}`"),
        Value::Number(n) => format!("`{n}`"),
        Value::String(s) => format!("`{s}`"),
        Value::Array(_) => "a sequence".to_string(),
        Value::Object(_) => "a mapping".to_string(),
    }
}
