//! Provider response envelope and candidate text extraction.

use serde::{Deserialize, Serialize};

use crate::error::{ProofreadError, Result};

/// Finish reason reported by the provider for a normal completion.
pub const NORMAL_FINISH_REASON: &str = "STOP";

/// Raw reply from the model client, prior to any interpretation.
///
/// Reason labels are kept as opaque strings. Only their presence, and whether
/// the finish reason is [`NORMAL_FINISH_REASON`], affect normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// One completion option within a provider response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A fragment of generated content. Non-text parts carry no `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ProviderResponse {
    /// Builds a response with a single normally-finished candidate holding `parts`.
    pub fn from_texts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt_feedback: None,
            candidates: vec![Candidate {
                finish_reason: Some(NORMAL_FINISH_REASON.to_string()),
                content: Some(Content {
                    parts: parts
                        .into_iter()
                        .map(|text| Part {
                            text: Some(text.into()),
                        })
                        .collect(),
                    role: Some("model".to_string()),
                }),
            }],
        }
    }

    /// Builds a response rejected with the given block reason.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some(reason.into()),
            }),
            candidates: Vec::new(),
        }
    }

    /// Returns the block reason, if the provider refused the prompt.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .filter(|reason| !reason.is_empty())
    }
}

/// Pulls the generated text out of the first candidate.
///
/// Text parts are joined with newlines and the result is trimmed. Parts
/// without text, or with empty text, are skipped.
///
/// Returns `Ok(None)` when there is no candidate or no text part; callers
/// treat that as [`ProofreadError::EmptyResponse`].
///
/// # Errors
///
/// Returns [`ProofreadError::ProviderRejected`] if the response carries a
/// block reason, and [`ProofreadError::IncompleteResponse`] if the first
/// candidate finished for any reason other than [`NORMAL_FINISH_REASON`].
pub fn extract_candidate_text(response: &ProviderResponse) -> Result<Option<String>> {
    if let Some(reason) = response.block_reason() {
        return Err(ProofreadError::ProviderRejected(reason.to_string()));
    }

    let Some(candidate) = response.candidates.first() else {
        return Ok(None);
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if !reason.is_empty() && reason != NORMAL_FINISH_REASON {
            return Err(ProofreadError::IncompleteResponse(reason.to_string()));
        }
    }

    let texts: Vec<&str> = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect();

    if texts.is_empty() {
        return Ok(None);
    }

    Ok(Some(texts.join("\n").trim().to_string()))
}
