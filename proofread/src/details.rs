//! Splits the `details` field into labeled sections.
//!
//! Each section is found by its leftmost label and runs up to the next label
//! of one of the other two sections, so the sections may appear in any order.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

static LEADING_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[#\-*\s]+").expect("Invalid leading marks pattern"));

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Invalid blank lines pattern"));

static DEFAULT_PARSER: Lazy<Result<SectionParser, regex::Error>> = Lazy::new(SectionParser::new);

/// One of the three sections of the details text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Corrections,
    Improvements,
    Notes,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::Corrections, Self::Improvements, Self::Notes];

    /// Label alternatives that open this section, tried in order.
    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            Self::Corrections => &["修正内容", "修正", "corrections?", "変更点"],
            Self::Improvements => &["改善点", "改善", "improvements?"],
            Self::Notes => &["注意点", "注意", "notes?"],
        }
    }

    /// Labels that end this section's body.
    const fn boundaries(self) -> &'static [&'static str] {
        match self {
            Self::Corrections => &["改善点", "improvements?", "注意点", "notes?"],
            Self::Improvements => &["注意点", "notes?", "修正内容", "corrections?"],
            Self::Notes => &["修正内容", "corrections?", "改善点", "improvements?"],
        }
    }
}

/// The details text split into sections.
///
/// Either the three sections are populated (possibly with empty strings) and
/// there is no fallback text, or all three are empty and the fallback text
/// holds the trimmed original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadDetails {
    corrections: String,
    improvements: String,
    notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_text: Option<String>,
}

impl ProofreadDetails {
    /// Creates the structured state.
    pub fn sections(
        corrections: impl Into<String>,
        improvements: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            corrections: corrections.into(),
            improvements: improvements.into(),
            notes: notes.into(),
            fallback_text: None,
        }
    }

    /// Creates the fallback state from the original text.
    pub fn fallback(original: &str) -> Self {
        Self {
            fallback_text: Some(original.trim().to_string()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn corrections(&self) -> &str {
        &self.corrections
    }

    #[inline]
    pub fn improvements(&self) -> &str {
        &self.improvements
    }

    #[inline]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[inline]
    pub fn fallback_text(&self) -> Option<&str> {
        self.fallback_text.as_deref()
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.fallback_text.is_some()
    }

    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Corrections => &self.corrections,
            Section::Improvements => &self.improvements,
            Section::Notes => &self.notes,
        }
    }
}

#[derive(Debug, Clone)]
struct SectionPattern {
    label: Regex,
    boundary: Regex,
}

impl SectionPattern {
    fn new(section: Section) -> Result<Self, regex::Error> {
        Ok(Self {
            label: build(&format!(
                r"(?:{})[:：]?\s*",
                section.labels().join("|")
            ))?,
            boundary: build(&format!("(?:{})", section.boundaries().join("|")))?,
        })
    }

    /// Returns the trimmed body after the leftmost label, or "" if absent.
    fn extract<'a>(&self, text: &'a str) -> &'a str {
        let Some(label) = self.label.find(text) else {
            return "";
        };
        let rest = &text[label.end()..];
        let end = self.boundary.find(rest).map_or(rest.len(), |m| m.start());
        rest[..end].trim()
    }
}

fn build(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

/// Parser for the details text.
///
/// # Examples
///
/// ```
/// use proofread::details::SectionParser;
///
/// let parser = SectionParser::new().unwrap();
/// let details = parser.parse("改善点: 語順\n修正内容: 誤字");
/// assert_eq!(details.corrections(), "誤字");
/// assert_eq!(details.improvements(), "語順");
/// assert_eq!(details.notes(), "");
/// ```
#[derive(Debug, Clone)]
pub struct SectionParser {
    patterns: Vec<(Section, SectionPattern)>,
}

impl SectionParser {
    /// Compiles the section patterns.
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = Section::ALL
            .into_iter()
            .map(|section| SectionPattern::new(section).map(|pattern| (section, pattern)))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub fn parse(&self, text: &str) -> ProofreadDetails {
        let mut bodies = ["", "", ""];
        for (slot, (_, pattern)) in bodies.iter_mut().zip(&self.patterns) {
            *slot = pattern.extract(text);
        }

        if bodies.iter().all(|body| body.is_empty()) {
            tracing::debug!("no labeled sections found in details");
            return ProofreadDetails::fallback(text);
        }

        let [corrections, improvements, notes] = bodies.map(clean_section);
        ProofreadDetails::sections(corrections, improvements, notes)
    }
}

/// Strips leading heading and bullet marks, collapses blank lines, trims.
fn clean_section(text: &str) -> String {
    let stripped = LEADING_MARKS.replace(text, "");
    BLANK_LINES.replace_all(&stripped, "\n").trim().to_string()
}

/// Splits `details` into sections, degrading to the fallback state on any
/// failure. Never errors.
///
/// # Examples
///
/// ```
/// use proofread::parse_details;
///
/// let details = parse_details("これは解析できない形式です。");
/// assert_eq!(details.corrections(), "");
/// assert_eq!(details.fallback_text(), Some("これは解析できない形式です。"));
/// ```
pub fn parse_details(text: &str) -> ProofreadDetails {
    match DEFAULT_PARSER.as_ref() {
        Ok(parser) => parser.parse(text),
        Err(err) => {
            tracing::warn!(error = %err, "section patterns unavailable, using fallback");
            ProofreadDetails::fallback(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_three_sections() {
        let details = parse_details(
            "修正内容: 誤字を直しました。\n改善点: 読みやすい語順に調整しました。\n注意点: 敬語の使い方に注意してください。",
        );
        assert_eq!(details.corrections(), "誤字を直しました。");
        assert_eq!(details.improvements(), "読みやすい語順に調整しました。");
        assert_eq!(details.notes(), "敬語の使い方に注意してください。");
        assert_eq!(details.fallback_text(), None);
    }

    #[test]
    fn test_no_labels_falls_back() {
        let details = parse_details("  これは解析できない形式です。\n");
        assert!(details.is_fallback());
        assert_eq!(details.corrections(), "");
        assert_eq!(details.improvements(), "");
        assert_eq!(details.notes(), "");
        assert_eq!(details.fallback_text(), Some("これは解析できない形式です。"));
    }

    #[test]
    fn test_english_labels_any_case() {
        let details = parse_details("Notes: keep it short\nCorrections: fixed typo\nImprovement - word order");
        assert_eq!(details.corrections(), "fixed typo");
        assert_eq!(details.improvements(), "word order");
        assert_eq!(details.notes(), "keep it short");
    }

    #[test]
    fn test_full_width_colon() {
        let details = parse_details("修正内容：A\n注意点：C");
        assert_eq!(details.corrections(), "A");
        assert_eq!(details.improvements(), "");
        assert_eq!(details.notes(), "C");
    }

    #[test]
    fn test_cleans_markdown_bullets_and_blank_lines() {
        let details = parse_details("修正内容:\n- 誤字\n\n\n- 脱字\n改善点:\n* 語順\n注意点:\n### 敬語");
        assert_eq!(details.corrections(), "誤字\n- 脱字");
        assert_eq!(details.improvements(), "語順");
        assert_eq!(details.notes(), "敬語");
    }

    #[test]
    fn test_partial_sections_are_not_fallback() {
        let details = parse_details("注意点: 敬語");
        assert!(!details.is_fallback());
        assert_eq!(details.get(Section::Notes), "敬語");
        assert_eq!(details.get(Section::Corrections), "");
    }

    #[test]
    fn test_serialized_shapes() {
        let structured = serde_json::to_value(ProofreadDetails::sections("a", "b", "c")).unwrap();
        assert_eq!(
            structured,
            serde_json::json!({"corrections": "a", "improvements": "b", "notes": "c"})
        );

        let fallback = serde_json::to_value(ProofreadDetails::fallback(" raw ")).unwrap();
        assert_eq!(fallback["fallbackText"], "raw");
        assert_eq!(fallback["corrections"], "");
    }
}
