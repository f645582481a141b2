//! Tests for splitting the details field into sections.

use pretty_assertions::assert_eq;
use proofread::{
    normalize_response, parse_details, provider::ProviderResponse, ProofreadDetails, Section,
    SectionParser,
};

#[test]
fn test_three_labeled_sections() {
    let input = [
        "修正内容: 誤字を直しました。",
        "改善点: 読みやすい語順に調整しました。",
        "注意点: 敬語の使い方に注意してください。",
    ]
    .join("\n");

    let result = parse_details(&input);

    assert_eq!(result.corrections(), "誤字を直しました。");
    assert_eq!(result.improvements(), "読みやすい語順に調整しました。");
    assert_eq!(result.notes(), "敬語の使い方に注意してください。");
    assert_eq!(result.fallback_text(), None);
}

#[test]
fn test_unlabeled_text_falls_back() {
    let result = parse_details("これは解析できない形式です。");

    assert_eq!(result.corrections(), "");
    assert_eq!(result.improvements(), "");
    assert_eq!(result.notes(), "");
    assert_eq!(result.fallback_text(), Some("これは解析できない形式です。"));
}

#[test]
fn test_sections_in_any_order() {
    let input = "注意点：固有名詞は未確認です。\n\n修正内容：句読点を統一しました。\n改善点：冗長な表現を削りました。";

    let result = parse_details(input);

    assert_eq!(result.corrections(), "句読点を統一しました。");
    assert_eq!(result.improvements(), "冗長な表現を削りました。");
    assert_eq!(result.notes(), "固有名詞は未確認です。");
}

#[test]
fn test_markdown_headings_and_bullets() {
    let input = "### 修正内容\n- 「以外」を「意外」に修正\n\n\n- 送り仮名を統一\n### 改善点\n* 一文を短く\n### 注意点\n特になし";

    let result = parse_details(input);

    assert_eq!(
        result.corrections(),
        "「以外」を「意外」に修正\n- 送り仮名を統一\n###"
    );
    assert_eq!(result.improvements(), "一文を短く\n###");
    assert_eq!(result.notes(), "特になし");
}

#[test]
fn test_short_label_forms() {
    let result = parse_details("修正: A\n改善: B\n注意: C");

    assert_eq!(result.corrections(), "A\n改善: B\n注意: C");
    assert_eq!(result.improvements(), "B\n注意: C");
    assert_eq!(result.notes(), "C");
}

#[test]
fn test_english_plural_and_singular_labels() {
    let result = parse_details("CORRECTION: typo\nImprovements: flow\nnote: none");

    assert_eq!(result.corrections(), "typo");
    assert_eq!(result.improvements(), "flow");
    assert_eq!(result.notes(), "none");
}

#[test]
fn test_label_without_body_is_empty_section() {
    let result = parse_details("修正内容:\n改善点: B");

    assert!(!result.is_fallback());
    assert_eq!(result.corrections(), "");
    assert_eq!(result.improvements(), "B");
}

#[test]
fn test_only_labels_with_empty_bodies_falls_back() {
    let result = parse_details("  修正内容:   ");

    assert!(result.is_fallback());
    assert_eq!(result.fallback_text(), Some("修正内容:"));
}

#[test]
fn test_get_by_section() {
    let result = ProofreadDetails::sections("a", "b", "c");
    let values: Vec<&str> = Section::ALL.iter().map(|s| result.get(*s)).collect();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_parser_instance_matches_default() {
    let parser = SectionParser::new().unwrap();
    let input = "修正内容: X\n注意点: Z";
    assert_eq!(parser.parse(input), parse_details(input));
}

#[test]
fn test_structured_details_from_normalized_result() {
    let response = ProviderResponse::from_texts([serde_json::json!({
        "correctedText": "修正後",
        "summary": "概要",
        "details": "修正内容: 誤字\n改善点: 語順\n注意点: 敬語"
    })
    .to_string()]);

    let result = normalize_response(&response).unwrap();
    let details = parse_details(result.details());

    assert_eq!(details.corrections(), "誤字");
    assert_eq!(details.improvements(), "語順");
    assert_eq!(details.notes(), "敬語");
}

#[test]
fn test_structured_contract_with_prose_details() {
    // A valid contract whose details are unlabeled prose still degrades at
    // the section layer.
    let response = ProviderResponse::from_texts([serde_json::json!({
        "correctedText": "修正後",
        "summary": "概要",
        "details": "全体的に読みやすくなりました。"
    })
    .to_string()]);

    let result = normalize_response(&response).unwrap();
    assert!(result.warnings().is_empty());

    let details = parse_details(result.details());
    assert!(details.is_fallback());
    assert_eq!(details.fallback_text(), Some("全体的に読みやすくなりました。"));
}
