//! The output contract every normalization outcome must populate.

use std::fmt;

use proofread_derive::RequiredFields;
use serde::{Deserialize, Serialize};

/// Types whose required string fields can be checked for emptiness.
///
/// Usually derived with `#[derive(RequiredFields)]`.
pub trait RequiredFields {
    /// Wire names of required fields that are empty, in declaration order.
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Returns true if every required field is populated.
    fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// The three fields the model is instructed to emit as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, RequiredFields)]
#[serde(rename_all = "camelCase")]
pub struct OutputContract {
    pub corrected_text: String,
    pub summary: String,
    pub details: String,
}

/// A diagnostic recorded while normalizing a response.
///
/// Warnings are never raised as errors; they accumulate in order and travel
/// with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No fenced JSON block and no brace-delimited region in the text.
    NoJsonBlock,
    /// The located block did not parse; repairs are about to be applied.
    ParseFailedRepairing,
    /// The repaired block parsed.
    RepairSucceeded,
    /// The repaired block still did not parse.
    RepairFailed,
    /// The parsed value did not satisfy the output contract.
    SchemaValidationFailed {
        /// Why validation failed (missing fields or a type error).
        reason: String,
    },
    /// The raw text was used to synthesize the output contract.
    FallbackGenerated,
}

impl Warning {
    /// Returns the fixed human-readable message for this warning.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NoJsonBlock => "JSON 形式のブロックが見つかりませんでした。",
            Self::ParseFailedRepairing => "JSON パースに失敗したため簡易修正を試みます。",
            Self::RepairSucceeded => "JSON の簡易修正に成功しました。",
            Self::RepairFailed => "JSON の修復にも失敗しました。",
            Self::SchemaValidationFailed { .. } => "スキーマ検証に失敗しました。",
            Self::FallbackGenerated => "フォールバックの校正結果を生成しました。",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaValidationFailed { reason } => write!(f, "{} ({reason})", self.message()),
            _ => f.write_str(self.message()),
        }
    }
}

/// Normalized output of one model call.
///
/// Serializes as the three contract fields only. `warnings` and `raw_text`
/// are diagnostics for the caller and stay off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResult {
    #[serde(flatten)]
    pub contract: OutputContract,
    #[serde(skip)]
    warnings: Vec<Warning>,
    #[serde(skip)]
    raw_text: String,
}

impl NormalizedResult {
    pub(crate) fn new(contract: OutputContract, warnings: Vec<Warning>, raw_text: String) -> Self {
        Self {
            contract,
            warnings,
            raw_text,
        }
    }

    #[inline]
    pub fn corrected_text(&self) -> &str {
        &self.contract.corrected_text
    }

    #[inline]
    pub fn summary(&self) -> &str {
        &self.contract.summary
    }

    #[inline]
    pub fn details(&self) -> &str {
        &self.contract.details
    }

    /// Diagnostics in the order they were recorded. Empty on a clean parse.
    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// The extracted model text before any interpretation.
    #[inline]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Returns true if the result came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        self.warnings.contains(&Warning::FallbackGenerated)
    }

    /// Consumes self and returns the contract.
    #[inline]
    pub fn into_contract(self) -> OutputContract {
        self.contract
    }
}
