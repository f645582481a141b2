//! Locators that find a candidate JSON block inside free-form model text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code block explicitly labeled `json`.
static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("Invalid fenced block pattern"));

/// First `{` through the last `}`, with at least one character in between.
static BRACE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.+\}").expect("Invalid brace span pattern"));

/// A JSON candidate located in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBlock {
    /// The located text, trimmed.
    pub content: String,
    /// How the block was located.
    pub source: BlockSource,
}

/// Describes how a block was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    /// Inside a ```` ```json ```` fence.
    Fenced,
    /// Between the first `{` and the last `}`.
    Braces,
}

impl BlockSource {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fenced => "fenced",
            Self::Braces => "braces",
        }
    }
}

/// Trait for strategies that locate a JSON block in text.
///
/// Locators don't parse or repair anything. They only point at the
/// substring that should be handed to the parser.
pub trait BlockLocator: Send + Sync + std::fmt::Debug {
    /// Returns the name of this locator for debugging.
    fn name(&self) -> &'static str;

    /// Returns the located block, or `None` if this locator found nothing.
    fn locate(&self, input: &str) -> Option<JsonBlock>;

    /// Returns the priority of this locator. Lower values are tried first.
    fn priority(&self) -> u8;
}

/// Locates the first fenced code block labeled `json` (case-insensitive).
///
/// An empty fence is treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedLocator;

impl BlockLocator for FencedLocator {
    fn name(&self) -> &'static str {
        "fenced"
    }

    fn locate(&self, input: &str) -> Option<JsonBlock> {
        let body = FENCED_JSON.captures(input)?.get(1)?.as_str();
        if body.is_empty() {
            return None;
        }
        Some(JsonBlock {
            content: body.trim().to_string(),
            source: BlockSource::Fenced,
        })
    }

    fn priority(&self) -> u8 {
        1
    }
}

/// Locates the widest brace-delimited region in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceSpanLocator;

impl BlockLocator for BraceSpanLocator {
    fn name(&self) -> &'static str {
        "braces"
    }

    fn locate(&self, input: &str) -> Option<JsonBlock> {
        let span = BRACE_SPAN.find(input)?;
        Some(JsonBlock {
            content: span.as_str().trim().to_string(),
            source: BlockSource::Braces,
        })
    }

    fn priority(&self) -> u8 {
        2
    }
}

/// Runs locators in priority order and returns the first hit.
///
/// # Examples
///
/// ```
/// use proofread::normalizer::{BlockSource, JsonBlockLocator};
///
/// let locator = JsonBlockLocator::new();
/// let block = locator.locate("結果:\n```json\n{\"a\": 1}\n```").unwrap();
/// assert_eq!(block.content, "{\"a\": 1}");
/// assert_eq!(block.source, BlockSource::Fenced);
/// ```
#[derive(Debug)]
pub struct JsonBlockLocator {
    locators: Vec<Box<dyn BlockLocator>>,
}

impl Default for JsonBlockLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonBlockLocator {
    /// Creates a locator that prefers fenced JSON, then the brace span.
    pub fn new() -> Self {
        Self::with_locators(vec![Box::new(FencedLocator), Box::new(BraceSpanLocator)])
    }

    /// Creates a locator from custom strategies, sorted by priority.
    pub fn with_locators(mut locators: Vec<Box<dyn BlockLocator>>) -> Self {
        locators.sort_by_key(|l| l.priority());
        Self { locators }
    }

    pub fn locate(&self, input: &str) -> Option<JsonBlock> {
        self.locators.iter().find_map(|locator| {
            let block = locator.locate(input)?;
            tracing::trace!(locator = locator.name(), len = block.content.len(), "located JSON block");
            Some(block)
        })
    }

    /// Returns the names of all registered locators in priority order.
    pub fn locator_names(&self) -> Vec<&'static str> {
        self.locators.iter().map(|l| l.name()).collect()
    }
}
