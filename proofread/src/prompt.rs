//! Proofreading requests and the prompt that instructs the model to emit the
//! output contract as JSON.

use std::fmt;

use proofread_derive::RequiredFields;
use serde::{Deserialize, Serialize};

use crate::{
    contract::RequiredFields,
    error::{ProofreadError, Result},
};

/// Maximum length of the text to proofread, in characters.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Writing style the corrected text should follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Business,
    Casual,
    Academic,
    Report,
}

impl Style {
    pub const ALL: [Style; 4] = [Self::Business, Self::Casual, Self::Academic, Self::Report];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Casual => "casual",
            Self::Academic => "academic",
            Self::Report => "report",
        }
    }

    const fn instruction(self) -> &'static str {
        match self {
            Self::Business => "敬語を正しく保ち、簡潔で信頼感のある表現を重視してください。",
            Self::Casual => "親しみやすい口調で、読者との距離を縮める表現を意識してください。",
            Self::Academic => "論理性と正確性を最優先し、専門用語の使い方に注意してください。",
            Self::Report => "客観的で事実に基づく記述を心掛け、明確な結論を導いてください。",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How deep the proofreading should go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Basic,
    #[default]
    Standard,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Self::Basic, Self::Standard, Self::Advanced];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Advanced => "advanced",
        }
    }

    const fn instructions(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &["誤字脱字の修正", "文法エラーの修正"],
            Self::Standard => &["basic の内容", "より自然な日本語表現への改善"],
            Self::Advanced => &[
                "standard の内容",
                "文章構造の最適化（意味が変わらない範囲で）",
                "敬語表現の粒度調整",
            ],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proofreading request as received at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, RequiredFields)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadRequest {
    pub text: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl ProofreadRequest {
    /// Creates a request with the default style and level.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
            level: Level::default(),
            custom_prompt: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// Checks the text is present and within [`MAX_TEXT_LENGTH`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`ProofreadError::InvalidRequest`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if let Some(&field) = self.missing_fields().first() {
            return Err(ProofreadError::invalid_request(field, "校正対象の文章は必須です。"));
        }
        // Whitespace-only text is as good as empty.
        if self.text.trim().is_empty() {
            return Err(ProofreadError::invalid_request("text", "校正対象の文章は必須です。"));
        }
        if self.text.chars().count() > MAX_TEXT_LENGTH {
            return Err(ProofreadError::invalid_request(
                "text",
                "文章は10,000文字以内で入力してください。",
            ));
        }
        Ok(())
    }
}

/// Builds the prompt for a request.
///
/// # Examples
///
/// ```
/// use proofread::prompt::{build_prompt, ProofreadRequest};
///
/// let prompt = build_prompt(&ProofreadRequest::new("本文"));
/// assert!(prompt.contains("文体: business"));
/// assert!(prompt.ends_with("対象文章:\n本文"));
/// ```
pub fn build_prompt(request: &ProofreadRequest) -> String {
    let mut lines: Vec<String> = vec![
        "あなたは日本語の校正・校閲の専門家です。以下の文章を適切に校正してください。".into(),
        String::new(),
        format!("文体: {}", request.style),
        request.style.instruction().into(),
        String::new(),
        format!("校正レベル: {}", request.level),
    ];
    lines.extend(
        request
            .level
            .instructions()
            .iter()
            .map(|item| format!("- {item}")),
    );
    lines.extend(
        [
            "",
            "必ず以下の JSON 形式で回答してください:",
            "{",
            r#"  "correctedText": "校正後の文章","#,
            r#"  "summary": "修正概要（1-2行）","#,
            r#"  "details": "詳細な修正理由と改善ポイント""#,
            "}",
        ]
        .map(String::from),
    );

    if let Some(custom) = request
        .custom_prompt
        .as_deref()
        .map(str::trim)
        .filter(|custom| !custom.is_empty())
    {
        lines.extend(["".into(), "追加の指示（ユーザー指定）:".into(), custom.to_string()]);
    }

    lines.extend(["".into(), "対象文章:".into(), request.text.clone()]);

    lines.join("\n")
}
