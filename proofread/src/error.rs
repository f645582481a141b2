//! Error types for proofreading response normalization.
//!
//! Only hard failures live here. Anything the pipeline can recover from is
//! reported as a [`Warning`](crate::contract::Warning) instead.

use std::time::Duration;

/// Result type alias for proofreading operations.
pub type Result<T> = std::result::Result<T, ProofreadError>;

/// Errors that abort a proofreading call.
#[derive(Debug, thiserror::Error)]
pub enum ProofreadError {
    /// The provider refused the prompt and reported a block reason.
    #[error("Gemini がリクエストを拒否しました: {0}")]
    ProviderRejected(String),

    /// The first candidate stopped for a reason other than normal completion.
    #[error("Gemini 応答が途中終了しました: {0}")]
    IncompleteResponse(String),

    /// The response carried no text at all.
    #[error("Gemini レスポンスからテキストを取得できませんでした。")]
    EmptyResponse,

    /// The model call did not finish before the deadline.
    #[error("Gemini API の応答がタイムアウトしました。({}ms)", .0.as_millis())]
    Timeout(Duration),

    /// The caller cancelled the in-flight model call.
    #[error("Gemini API の呼び出しがキャンセルされました。")]
    Cancelled,

    /// No API key was configured when the client was first needed.
    #[error("GEMINI_API_KEY が設定されていません。")]
    MissingApiKey,

    /// The incoming request failed validation.
    #[error("リクエスト内容が正しくありません: {field}: {message}")]
    InvalidRequest {
        /// Wire name of the offending field.
        field: &'static str,
        /// Description of why the field is invalid.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The model client failed at the transport level.
    #[error("Model client error: {0}")]
    Client(String),
}

impl ProofreadError {
    /// Creates an invalid request error.
    #[inline]
    pub fn invalid_request(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            message: message.into(),
        }
    }

    /// Returns true for failures caused by the provider's response content,
    /// as opposed to transport, deadline or configuration problems.
    pub const fn is_content_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderRejected(_) | Self::IncompleteResponse(_) | Self::EmptyResponse
        )
    }
}

impl From<figment::Error> for ProofreadError {
    fn from(err: figment::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
