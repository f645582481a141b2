//! Synthesizes an output contract from raw text.

use crate::contract::OutputContract;

/// Summary shown when the model's output could not be read as structured data.
pub const FALLBACK_SUMMARY: &str =
    "AI 応答を JSON として解釈できなかったため、元の文章を表示しています。";

/// Builds the fallback contract: the raw text becomes both the corrected text
/// and the details, with [`FALLBACK_SUMMARY`] as the summary. Never fails.
pub fn build_fallback(raw_text: &str) -> OutputContract {
    OutputContract {
        corrected_text: raw_text.to_string(),
        summary: FALLBACK_SUMMARY.to_string(),
        details: raw_text.to_string(),
    }
}
