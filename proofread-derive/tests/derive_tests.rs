//! Integration tests for the RequiredFields derive macro.

use proofread::contract::RequiredFields;
use proofread_derive::RequiredFields;
use serde::Deserialize;

// ============================================================================
// Plain structs
// ============================================================================

#[derive(RequiredFields)]
struct Plain {
    title: String,
    body: String,
    count: u32,
}

#[test]
fn test_all_present() {
    let value = Plain {
        title: "a".into(),
        body: "b".into(),
        count: 0,
    };
    assert!(value.missing_fields().is_empty());
}

#[test]
fn test_reports_in_declaration_order() {
    let value = Plain {
        title: String::new(),
        body: String::new(),
        count: 3,
    };
    assert_eq!(value.missing_fields(), vec!["title", "body"]);
}

// ============================================================================
// Serde renames
// ============================================================================

#[derive(Deserialize, RequiredFields)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Renamed {
    corrected_text: String,
    #[serde(rename = "overview")]
    summary: String,
    #[serde(default)]
    custom_prompt: Option<String>,
}

#[test]
fn test_rename_all_camel_case() {
    let value = Renamed {
        corrected_text: String::new(),
        summary: "ok".into(),
        custom_prompt: None,
    };
    assert_eq!(value.missing_fields(), vec!["correctedText"]);
}

#[test]
fn test_field_rename_wins() {
    let value = Renamed {
        corrected_text: "ok".into(),
        summary: String::new(),
        custom_prompt: Some(String::new()),
    };
    assert_eq!(value.missing_fields(), vec!["overview"]);
}

// ============================================================================
// Skipped fields
// ============================================================================

#[derive(RequiredFields)]
struct WithSkip {
    name: String,
    #[required(skip)]
    note: String,
}

#[test]
fn test_skipped_field_not_checked() {
    let value = WithSkip {
        name: "x".into(),
        note: String::new(),
    };
    assert!(value.missing_fields().is_empty());
}
