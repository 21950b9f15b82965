//! Coercion of loosely typed JSON values into feature numbers.
//!
//! Two entry points with a fixed order of attempts:
//!
//! - [`as_number`]: a float cast. Numbers pass through, booleans become
//!   1.0/0.0, strings are trimmed and parsed (non-finite results fail).
//!   Null, arrays and objects fail.
//! - [`as_flag_or_number`]: [`as_number`], then a case-insensitive boolean
//!   token (`true/yes/y`, `false/no/n`).
//!
//! Neither function invents a default; callers decide what a failure means.
//! [`read_json`] decodes artefact files for the loaders.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::error::{RiskError, RiskResult};

/// Interpret a value the way a plain float cast would.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Interpret a value as a number, falling back to yes/no style tokens.
pub fn as_flag_or_number(value: &Value) -> Option<f64> {
    as_number(value).or_else(|| match value {
        Value::String(s) => flag_token(s),
        _ => None,
    })
}

fn flag_token(raw: &str) -> Option<f64> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" => Some(1.0),
        "false" | "no" | "n" => Some(0.0),
        _ => None,
    }
}

/// Render a scalar as text, used for date fields supplied as non-strings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read and decode `path`, mapping "not found" to `None`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> RiskResult<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RiskError::io(path, err)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| RiskError::json(path, err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(as_number(&json!(70)), Some(70.0));
        assert_eq!(as_number(&json!(-1.5)), Some(-1.5));
        assert_eq!(as_number(&json!(" 98.6 ")), Some(98.6));
        assert_eq!(as_number(&json!("1e2")), Some(100.0));
        assert_eq!(as_number(&json!(true)), Some(1.0));
        assert_eq!(as_number(&json!(false)), Some(0.0));
    }

    #[test]
    fn non_scalars_do_not_coerce() {
        assert_eq!(as_number(&Value::Null), None);
        assert_eq!(as_number(&json!([1])), None);
        assert_eq!(as_number(&json!({"v": 1})), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!("yes")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("-inf")), None);
    }

    #[test]
    fn flag_tokens_are_case_insensitive() {
        assert_eq!(as_flag_or_number(&json!("yes")), Some(1.0));
        assert_eq!(as_flag_or_number(&json!("Y")), Some(1.0));
        assert_eq!(as_flag_or_number(&json!("TRUE")), Some(1.0));
        assert_eq!(as_flag_or_number(&json!("no")), Some(0.0));
        assert_eq!(as_flag_or_number(&json!("N")), Some(0.0));
        assert_eq!(as_flag_or_number(&json!("False")), Some(0.0));
        assert_eq!(as_flag_or_number(&json!("maybe")), None);
        assert_eq!(as_flag_or_number(&Value::Null), None);
    }

    #[test]
    fn scalar_text_skips_empty_and_null() {
        assert_eq!(scalar_text(&json!("2024-01-01")).as_deref(), Some("2024-01-01"));
        assert_eq!(scalar_text(&json!(20240101)).as_deref(), Some("20240101"));
        assert_eq!(scalar_text(&json!("")), None);
        assert_eq!(scalar_text(&Value::Null), None);
    }
}
