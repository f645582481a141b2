//! Normalizer that turns a provider response into a bounded output contract.

mod fallback;
mod locator;
mod repair;
mod validator;

pub use fallback::{build_fallback, FALLBACK_SUMMARY};
pub use locator::{BlockLocator, BlockSource, BraceSpanLocator, FencedLocator, JsonBlock, JsonBlockLocator};
pub use repair::{JsonRepairer, Repair, Repaired};
pub use validator::SchemaValidator;

use serde_json::Value;

use crate::{
    contract::{NormalizedResult, OutputContract, Warning},
    error::{ProofreadError, Result},
    provider::{extract_candidate_text, ProviderResponse},
    sanitize::{bound_contract, FieldLimits},
};

/// Ordered log of diagnostics gathered during one normalization.
#[derive(Debug, Clone, Default)]
pub struct WarningsCollector {
    warnings: Vec<Warning>,
}

impl WarningsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::debug!(warning = %warning, "normalization warning");
        self.warnings.push(warning);
    }

    #[inline]
    pub fn as_slice(&self) -> &[Warning] {
        &self.warnings
    }

    #[inline]
    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Normalizer for proofreading responses.
///
/// Locates a JSON block, parses it (repairing once if needed), validates it
/// against the contract, and falls back to the raw text when any of that
/// fails. Every outcome is sanitized and truncated.
///
/// # Examples
///
/// ```
/// use proofread::{normalizer::ResponseNormalizer, provider::ProviderResponse};
///
/// let response = ProviderResponse::from_texts([
///     r#"{"correctedText": "直した", "summary": "概要", "details": "詳細"}"#,
/// ]);
/// let result = ResponseNormalizer::new().normalize(&response).unwrap();
/// assert_eq!(result.corrected_text(), "直した");
/// assert!(result.warnings().is_empty());
/// ```
#[derive(Debug)]
pub struct ResponseNormalizer {
    locator: JsonBlockLocator,
    repairer: JsonRepairer,
    validator: SchemaValidator,
    limits: FieldLimits,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseNormalizer {
    /// Creates a normalizer with the default locators and field limits.
    pub fn new() -> Self {
        Self {
            locator: JsonBlockLocator::new(),
            repairer: JsonRepairer::new(),
            validator: SchemaValidator::new(),
            limits: FieldLimits::default(),
        }
    }

    /// Replaces the field limits.
    pub fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the block locator.
    pub fn with_locator(mut self, locator: JsonBlockLocator) -> Self {
        self.locator = locator;
        self
    }

    #[inline]
    pub fn limits(&self) -> &FieldLimits {
        &self.limits
    }

    /// Normalizes a provider response.
    ///
    /// # Errors
    ///
    /// Fails only when the response itself is unusable:
    /// [`ProofreadError::ProviderRejected`], [`ProofreadError::IncompleteResponse`]
    /// or [`ProofreadError::EmptyResponse`]. Every other problem becomes a
    /// warning on the returned result.
    pub fn normalize(&self, response: &ProviderResponse) -> Result<NormalizedResult> {
        let raw_text = match extract_candidate_text(response) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("provider response contained no text");
                return Err(ProofreadError::EmptyResponse);
            }
            Err(err) => {
                tracing::warn!(error = %err, "provider response unusable");
                return Err(err);
            }
        };

        Ok(self.normalize_text(raw_text))
    }

    /// Normalizes already-extracted model text. Never fails.
    pub fn normalize_text(&self, raw_text: String) -> NormalizedResult {
        let mut warnings = WarningsCollector::new();

        let contract = match self.extract_contract(&raw_text, &mut warnings) {
            Some(contract) => contract,
            None => {
                warnings.push(Warning::FallbackGenerated);
                build_fallback(&raw_text)
            }
        };

        let bounded = bound_contract(&contract, &self.limits);
        NormalizedResult::new(bounded, warnings.into_vec(), raw_text)
    }

    /// Structured extraction: locate, parse, repair, validate.
    fn extract_contract(
        &self,
        raw_text: &str,
        warnings: &mut WarningsCollector,
    ) -> Option<OutputContract> {
        let Some(block) = self.locator.locate(raw_text) else {
            warnings.push(Warning::NoJsonBlock);
            return None;
        };

        if let Ok(value) = serde_json::from_str::<Value>(&block.content) {
            return self.validate(value, warnings);
        }

        warnings.push(Warning::ParseFailedRepairing);
        let repaired = self.repairer.repair(&block.content);

        match serde_json::from_str::<Value>(&repaired.text) {
            Ok(value) => {
                let fixes: Vec<&str> = repaired.applied.iter().map(|r| r.description()).collect();
                tracing::debug!(source = block.source.name(), ?fixes, "repaired JSON block");
                warnings.push(Warning::RepairSucceeded);
                self.validate(value, warnings)
            }
            Err(err) => {
                tracing::debug!(source = block.source.name(), error = %err, "JSON repair failed");
                warnings.push(Warning::RepairFailed);
                None
            }
        }
    }

    fn validate(&self, value: Value, warnings: &mut WarningsCollector) -> Option<OutputContract> {
        match self.validator.validate(value) {
            Ok(contract) => Some(contract),
            Err(reason) => {
                warnings.push(Warning::SchemaValidationFailed { reason });
                None
            }
        }
    }
}
