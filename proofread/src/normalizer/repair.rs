//! Best-effort textual repair of near-valid JSON.
//!
//! The substitutions run over the whole block, string contents included, so
//! a full-width comma that was part of the text is rewritten too.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("Invalid trailing comma pattern"));

/// A single textual repair, in the order the repairer applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repair {
    /// `（` and `）` replaced with `(` and `)`.
    FullWidthParentheses,
    /// `“` and `”` replaced with `"`.
    SmartQuotes,
    /// `：` replaced with `:`.
    FullWidthColon,
    /// `，` replaced with `,`.
    FullWidthComma,
    /// Commas directly before `}` or `]` removed.
    TrailingCommas,
}

impl Repair {
    /// Every repair, in application order.
    pub const ALL: [Repair; 5] = [
        Self::FullWidthParentheses,
        Self::SmartQuotes,
        Self::FullWidthColon,
        Self::FullWidthComma,
        Self::TrailingCommas,
    ];

    /// Returns a human-readable description of this repair.
    pub const fn description(self) -> &'static str {
        match self {
            Self::FullWidthParentheses => "converted full-width parentheses",
            Self::SmartQuotes => "converted curly double quotes",
            Self::FullWidthColon => "converted full-width colons",
            Self::FullWidthComma => "converted full-width commas",
            Self::TrailingCommas => "removed trailing commas",
        }
    }

    fn apply<'a>(self, input: &'a str) -> Cow<'a, str> {
        match self {
            Self::FullWidthParentheses => replace_chars(input, &[('（', "("), ('）', ")")]),
            Self::SmartQuotes => replace_chars(input, &[('“', "\""), ('”', "\"")]),
            Self::FullWidthColon => replace_chars(input, &[('：', ":")]),
            Self::FullWidthComma => replace_chars(input, &[('，', ",")]),
            Self::TrailingCommas => TRAILING_COMMA.replace_all(input, "$1"),
        }
    }
}

fn replace_chars<'a>(input: &'a str, table: &[(char, &str)]) -> Cow<'a, str> {
    if !input.chars().any(|c| table.iter().any(|(from, _)| *from == c)) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match table.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// The outcome of running the repairer over a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    /// The rewritten text.
    pub text: String,
    /// Repairs that changed the text, in application order.
    pub applied: Vec<Repair>,
}

/// Applies the fixed repair chain.
///
/// # Examples
///
/// ```
/// use proofread::normalizer::{JsonRepairer, Repair};
///
/// let repaired = JsonRepairer::new().repair("{“a”：1，}");
/// assert_eq!(repaired.text, r#"{"a":1}"#);
/// assert_eq!(repaired.applied, vec![
///     Repair::SmartQuotes,
///     Repair::FullWidthColon,
///     Repair::FullWidthComma,
///     Repair::TrailingCommas,
/// ]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepairer;

impl JsonRepairer {
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    pub fn repair(&self, input: &str) -> Repaired {
        let mut text = input.to_string();
        let mut applied = Vec::new();

        for repair in Repair::ALL {
            let next = match repair.apply(&text) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(next) => next,
            };
            if next != text {
                applied.push(repair);
                text = next;
            }
        }

        Repaired { text, applied }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_changes_reports_nothing() {
        let repaired = JsonRepairer::new().repair(r#"{"a": 1}"#);
        assert_eq!(repaired.text, r#"{"a": 1}"#);
        assert!(repaired.applied.is_empty());
    }

    #[test]
    fn test_full_width_parentheses() {
        let repaired = JsonRepairer::new().repair("{\"a\": \"（注）\"}");
        assert_eq!(repaired.text, r#"{"a": "(注)"}"#);
        assert_eq!(repaired.applied, vec![Repair::FullWidthParentheses]);
    }

    #[test]
    fn test_trailing_comma_before_bracket_and_brace() {
        let repaired = JsonRepairer::new().repair("{\"a\": [1, 2,\n ],\n}");
        assert_eq!(repaired.text, "{\"a\": [1, 2]}");
        assert_eq!(repaired.applied, vec![Repair::TrailingCommas]);
    }

    #[test]
    fn test_rewrites_inside_strings() {
        // Full-width commas in values are rewritten as well.
        let repaired = JsonRepairer::new().repair("{\"a\": \"はい，そうです\"}");
        assert_eq!(repaired.text, r#"{"a": "はい,そうです"}"#);
    }

    #[test]
    fn test_comma_repair_feeds_trailing_comma_repair() {
        let repaired = JsonRepairer::new().repair("{\"a\": 1，}");
        assert_eq!(repaired.text, r#"{"a": 1}"#);
        assert_eq!(
            repaired.applied,
            vec![Repair::FullWidthComma, Repair::TrailingCommas]
        );
    }
}
