//! Input validation
//!
//! Source text must be valid JSON with an object at the top level before the modal lexer
//! ever sees it. The check runs on `serde_json` with `preserve_order`, so the parsed object
//! keeps its members in source order.
//!
//! Arrays fold into a single token, so they may hold literals and arrays but not objects.

use serde_json::{Map, Value};
use std::fmt;

/// What a valid source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `{}`, which compiles to nothing
    Empty,
    Program,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },
    NotAnObject,
    /// An object nested inside an array, located by its path from the top level
    ObjectInArray { path: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Malformed {
                message,
                line,
                column,
            } => write!(f, "{} (line {}, column {})", message, line, column),
            InputError::NotAnObject => write!(f, "the top level must be a JSON object"),
            InputError::ObjectInArray { path } => {
                write!(f, "objects are not supported inside arrays (at {})", path)
            }
        }
    }
}

impl std::error::Error for InputError {}

pub fn check(text: &str) -> Result<InputKind, InputError> {
    let object = parse_object(text)?;
    for (key, value) in &object {
        reject_objects_in_arrays(value, key, false)?;
    }
    Ok(if object.is_empty() {
        InputKind::Empty
    } else {
        InputKind::Program
    })
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Parses `text` as a JSON object, members in source order.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, InputError> {
    let value: Value = serde_json::from_str(text).map_err(|e| InputError::Malformed {
        message: e.to_string(),
        line: e.line(),
        column: e.column(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(InputError::NotAnObject),
    }
}

fn reject_objects_in_arrays(value: &Value, path: &str, in_array: bool) -> Result<(), InputError> {
    match value {
        Value::Object(_) if in_array => Err(InputError::ObjectInArray {
            path: path.to_string(),
        }),
        Value::Object(map) => map.iter().try_for_each(|(key, v)| {
            reject_objects_in_arrays(v, &format!("{}.{}", path, key), false)
        }),
        Value::Array(items) => items.iter().enumerate().try_for_each(|(i, v)| {
            reject_objects_in_arrays(v, &format!("{}[{}]", path, i), true)
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_program() {
        assert_eq!(check("{}"), Ok(InputKind::Empty));
        assert_eq!(check(" {\n}\n"), Ok(InputKind::Empty));
        assert_eq!(check(r#"{"a": 1}"#), Ok(InputKind::Program));
    }

    #[test]
    fn test_non_object_top_level() {
        assert_eq!(check("[1, 2]"), Err(InputError::NotAnObject));
        assert_eq!(check("\"text\""), Err(InputError::NotAnObject));
        assert!(is_valid_json("[1, 2]"));
    }

    #[test]
    fn test_malformed_reports_position() {
        match check("{\n  \"a\": 1\n") {
            Err(InputError::Malformed { line, .. }) => assert!(line >= 2),
            other => panic!("expected malformed input, got {:?}", other),
        }
        assert!(!is_valid_json("{\"a\" 1}"));
    }

    #[test]
    fn test_objects_inside_arrays_are_rejected() {
        assert_eq!(
            check(r#"{"a": [{"b": 1}]}"#),
            Err(InputError::ObjectInArray {
                path: "a[0]".into()
            })
        );
        assert_eq!(
            check(r#"{"o": {"m": [1, [2, {}]]}}"#),
            Err(InputError::ObjectInArray {
                path: "o.m[1][1]".into()
            })
        );
        assert_eq!(check(r#"{"a": [[1], [], "x"]}"#), Ok(InputKind::Program));
    }

    #[test]
    fn test_object_keeps_member_order() {
        let object = parse_object(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
