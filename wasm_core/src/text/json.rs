//! JSON formatter helpers. Errors carry line/column so the UI can point at
//! the offending character.
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ToolError};

/// Parses a JSON document into `serde_json::Value`.
///
/// # Example
/// ```
/// use toolbox_core::text::json::parse_json;
/// let value = parse_json("{\"id\":1}")?;
/// assert_eq!(value["id"], 1);
/// # Ok::<(), toolbox_core::error::ToolError>(())
/// ```
pub fn parse_json(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Err(ToolError::invalid("input is empty"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Encodes a JSON `Value` with two-space indentation or minified, trimming
/// trailing newlines so the output is UI-friendly.
pub fn encode_json(value: &Value, minify: bool) -> Result<String> {
    let serialized = if minify {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }?;
    Ok(serialized.trim_end().to_string())
}

/// Pretty-prints or minifies `input`.
///
/// # Example
/// ```
/// use toolbox_core::text::json::format_json;
/// assert_eq!(format_json("{ \"a\": 1 }", true)?, "{\"a\":1}");
/// assert_eq!(format_json("{\"a\":1}", false)?, "{\n  \"a\": 1\n}");
/// # Ok::<(), toolbox_core::error::ToolError>(())
/// ```
pub fn format_json(input: &str, minify: bool) -> Result<String> {
    let value = parse_json(input)?;
    encode_json(&value, minify)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

pub fn validate_json(input: &str) -> JsonValidation {
    match parse_json(input) {
        Ok(_) => JsonValidation {
            valid: true,
            error: None,
            line: None,
            column: None,
        },
        Err(ToolError::Json {
            line,
            column,
            message,
        }) => JsonValidation {
            valid: false,
            error: Some(message),
            line: Some(line),
            column: Some(column),
        },
        Err(err) => JsonValidation {
            valid: false,
            error: Some(err.to_string()),
            line: None,
            column: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_preserves_key_order() {
        let out = format_json(r#"{"b":1,"a":[1,2]}"#, false).unwrap();
        assert_eq!(out, "{\n  \"b\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn invalid_json_reports_position() {
        let err = format_json("{\n  \"a\": tru\n}", false).unwrap_err();
        match err {
            ToolError::Json { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_reports_empty_and_broken_input() {
        assert!(validate_json("[1, 2]").valid);
        let empty = validate_json("   ");
        assert!(!empty.valid);
        assert_eq!(empty.line, None);
        let broken = validate_json("[1, 2");
        assert!(!broken.valid);
        assert_eq!(broken.line, Some(1));
        assert!(!broken.error.unwrap().contains("at line"));
    }
}
