//! # proofread
//!
//! Turns an unreliable, free-form proofreading response from a generative
//! model into a strictly-typed, bounded, safe-to-render result.
//!
//! The model is asked to answer with a JSON object holding `correctedText`,
//! `summary` and `details`. Models don't always comply, so normalization:
//! - Pulls the text out of the provider's response envelope
//! - Finds a JSON block (a ```` ```json ```` fence, else the outermost braces)
//! - Repairs common full-width punctuation and trailing commas once
//! - Validates the three required fields
//! - Falls back to the raw text when structured extraction fails
//! - Sanitizes markup and truncates every field
//!
//! Recoverable problems are reported as [`Warning`]s, never as errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use proofread::{normalize_response, parse_details, provider::ProviderResponse};
//!
//! let text = "```json\n{\"correctedText\": \"修正後テキスト\", \"summary\": \"概要です\", \
//!             \"details\": \"修正内容: A\\n改善点: B\\n注意点: C\"}\n```";
//! let response = ProviderResponse::from_texts([text]);
//!
//! let result = normalize_response(&response).unwrap();
//! assert_eq!(result.corrected_text(), "修正後テキスト");
//! assert!(result.warnings().is_empty());
//!
//! let details = parse_details(result.details());
//! assert_eq!(details.improvements(), "B");
//! ```
//!
//! ## Calling a model
//!
//! [`client::Proofreader`] wraps any [`client::ModelClient`] with request
//! validation, prompt construction, a deadline, and cancellation.

// Lets the derive macros refer to `::proofread` from inside this crate.
extern crate self as proofread;

pub mod client;
pub mod config;
pub mod contract;
pub mod details;
pub mod error;
pub mod normalizer;
pub mod prompt;
pub mod provider;
pub mod sanitize;

pub use contract::{NormalizedResult, OutputContract, RequiredFields, Warning};
pub use details::{parse_details, ProofreadDetails, Section, SectionParser};
pub use error::{ProofreadError, Result};
pub use proofread_derive::RequiredFields;

use normalizer::ResponseNormalizer;
use provider::ProviderResponse;

/// Normalizes a provider response with the default field limits.
///
/// # Examples
///
/// ```
/// use proofread::{normalize_response, provider::ProviderResponse};
///
/// let response = ProviderResponse::from_texts(["これはJSONでありません。"]);
/// let result = normalize_response(&response).unwrap();
///
/// assert_eq!(result.corrected_text(), "これはJSONでありません。");
/// assert!(result.summary().contains("JSON として解釈できなかった"));
/// assert!(!result.warnings().is_empty());
/// ```
///
/// # Errors
///
/// Returns [`ProofreadError::ProviderRejected`] if the provider blocked the
/// prompt, [`ProofreadError::IncompleteResponse`] if generation stopped
/// abnormally, and [`ProofreadError::EmptyResponse`] if there is no text.
pub fn normalize_response(response: &ProviderResponse) -> Result<NormalizedResult> {
    ResponseNormalizer::new().normalize(response)
}
