//! Validation of parsed JSON against the output contract.

use serde_json::Value;

use crate::contract::{OutputContract, RequiredFields};

/// Checks a parsed value against the three-field output contract.
///
/// The value must be a JSON object whose `correctedText`, `summary` and
/// `details` are non-empty strings. Unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the contract, or a description of why the value doesn't fit.
    pub fn validate(&self, value: Value) -> Result<OutputContract, String> {
        if !value.is_object() {
            return Err(format!("expected an object, found {}", type_name(&value)));
        }

        let contract: OutputContract =
            serde_json::from_value(value).map_err(|err| err.to_string())?;

        let missing = contract.missing_fields();
        if !missing.is_empty() {
            return Err(format!("empty fields: {}", missing.join(", ")));
        }

        Ok(contract)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_object() {
        let contract = SchemaValidator::new()
            .validate(json!({
                "correctedText": "a",
                "summary": "b",
                "details": "c",
                "extra": 1
            }))
            .unwrap();
        assert_eq!(contract.corrected_text, "a");
        assert_eq!(contract.summary, "b");
        assert_eq!(contract.details, "c");
    }

    #[test]
    fn test_missing_field() {
        let err = SchemaValidator::new()
            .validate(json!({"correctedText": "a", "summary": "b"}))
            .unwrap_err();
        assert!(err.contains("details"));
    }

    #[test]
    fn test_empty_field() {
        let err = SchemaValidator::new()
            .validate(json!({"correctedText": "a", "summary": "", "details": "c"}))
            .unwrap_err();
        assert_eq!(err, "empty fields: summary");
    }

    #[test]
    fn test_wrong_type() {
        let result = SchemaValidator::new()
            .validate(json!({"correctedText": 1, "summary": "b", "details": "c"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_array_rejected() {
        let err = SchemaValidator::new()
            .validate(json!(["a", "b", "c"]))
            .unwrap_err();
        assert!(err.contains("array"));
    }
}
