//! Markup sanitization and length bounding for output fields.
//!
//! The sanitizer keeps a small set of formatting tags and drops everything
//! that can execute script. Text outside tags gets its angle brackets
//! escaped, so removing a tag can never splice a new one together.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::contract::OutputContract;

/// Marker appended to a truncated field.
pub const TRUNCATION_MARKER: char = '…';

/// Elements removed together with everything inside them. An unclosed one
/// swallows the rest of the value.
const STRIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "svg", "math",
    "frame", "frameset", "applet", "xmp", "noembed", "noframes",
];

// Void elements such as `base`, `link` and `meta` have no content; they are
// dropped by the tag allowlist.

/// Formatting tags allowed through.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "div", "dl", "dt", "em", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "pre",
    "q", "rp", "rt", "ruby", "s", "small", "span", "strong", "sub", "sup", "table", "tbody",
    "td", "tfoot", "th", "thead", "tr", "u", "ul",
];

/// Attributes allowed on kept tags.
const ALLOWED_ATTRIBUTES: &[&str] = &[
    "alt", "cite", "class", "colspan", "datetime", "dir", "height", "href", "lang", "rel",
    "rowspan", "src", "title", "width",
];

/// Attributes whose value is a URL and needs a scheme check.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

/// Passes over stripped elements before giving up on nested reconstructions.
const MAX_STRIP_PASSES: usize = 8;

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("Invalid comment pattern"));

static STRIPPED: Lazy<Vec<Regex>> = Lazy::new(|| {
    STRIPPED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?(?:</{tag}\s*>|\z)"))
                .expect("Invalid stripped element pattern")
        })
        .collect()
});

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9-]*)\b([^>]*)>|<[!?][^>]*>")
        .expect("Invalid tag pattern")
});

static CHAR_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#[xX]([0-9a-fA-F]+);?|&#([0-9]+);?|&([a-zA-Z][a-zA-Z0-9]*);")
        .expect("Invalid character reference pattern")
});

/// Named references that can spell out a URL scheme or attribute syntax.
/// Any other name is left as literal text, as a browser would.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("colon", ':'),
    ("semi", ';'),
    ("sol", '/'),
    ("bsol", '\\'),
    ("lpar", '('),
    ("rpar", ')'),
    ("period", '.'),
    ("comma", ','),
    ("excl", '!'),
    ("num", '#'),
    ("percnt", '%'),
    ("equals", '='),
    ("quest", '?'),
    ("Tab", '\t'),
    ("NewLine", '\n'),
    ("nbsp", '\u{a0}'),
];

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/"'>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("Invalid attribute pattern")
});

/// Strips unsafe markup from a field value.
///
/// Values without `<` or `>` are returned unchanged.
///
/// # Examples
///
/// ```
/// use proofread::sanitize::sanitize_html;
///
/// assert_eq!(sanitize_html("<b>太字</b><script>alert(1)</script>"), "<b>太字</b>");
/// assert_eq!(sanitize_html("<a href=\"javascript:x()\">link</a>"), "<a>link</a>");
/// ```
pub fn sanitize_html(value: &str) -> String {
    if !value.contains(['<', '>']) {
        return value.to_string();
    }

    let mut text = COMMENT.replace_all(value, "").into_owned();
    for _ in 0..MAX_STRIP_PASSES {
        let mut next = text.clone();
        for pattern in STRIPPED.iter() {
            next = pattern.replace_all(&next, "").into_owned();
        }
        if next == text {
            break;
        }
        text = next;
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in TAG.captures_iter(&text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_escaped(&mut out, &text[last..whole.start()]);
        if let Some(tag) = rebuild_tag(&caps) {
            out.push_str(&tag);
        }
        last = whole.end();
    }
    push_escaped(&mut out, &text[last..]);

    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Rebuilds an allowed tag with only safe attributes. Returns `None` to drop it.
fn rebuild_tag(caps: &Captures<'_>) -> Option<String> {
    let name = caps.get(2)?.as_str().to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return None;
    }

    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    if closing {
        return Some(format!("</{name}>"));
    }

    let mut tag = format!("<{name}");
    let attributes = caps.get(3).map_or("", |m| m.as_str());
    for attr in ATTRIBUTE.captures_iter(attributes) {
        let Some(attr_name) = attr.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
            continue;
        };
        if !ALLOWED_ATTRIBUTES.contains(&attr_name.as_str()) {
            continue;
        }
        let raw = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());
        // Checks run on the value a browser would see, and that same value
        // is written back out.
        let Some(value) = decode_references(raw) else {
            continue;
        };
        if URL_ATTRIBUTES.contains(&attr_name.as_str()) && !is_safe_url(&attr_name, &value) {
            continue;
        }
        tag.push(' ');
        tag.push_str(&attr_name);
        tag.push_str("=\"");
        for c in value.chars() {
            match c {
                '&' => tag.push_str("&amp;"),
                '"' => tag.push_str("&quot;"),
                '<' => tag.push_str("&lt;"),
                '>' => tag.push_str("&gt;"),
                _ => tag.push(c),
            }
        }
        tag.push('"');
    }
    tag.push('>');

    Some(tag)
}

/// Decodes numeric and known named character references in an attribute
/// value. Returns `None` for a numeric reference that names no valid
/// character.
fn decode_references(value: &str) -> Option<String> {
    if !value.contains('&') {
        return Some(value.to_string());
    }

    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in CHAR_REFERENCE.captures_iter(value) {
        let whole = caps.get(0)?;
        out.push_str(&value[last..whole.start()]);
        last = whole.end();

        let code = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok()?
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok()?
        } else {
            let name = caps.get(3).map_or("", |m| m.as_str());
            match NAMED_REFERENCES.iter().find(|(known, _)| *known == name) {
                Some((_, c)) => out.push(*c),
                None => out.push_str(whole.as_str()),
            }
            continue;
        };
        match char::from_u32(code) {
            Some(c) if c != '\0' => out.push(c),
            _ => return None,
        }
    }
    out.push_str(&value[last..]);

    Some(out)
}

fn is_safe_url(attr_name: &str, value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        return false;
    }
    if normalized.starts_with("data:") {
        return attr_name == "src" && normalized.starts_with("data:image/");
    }
    true
}

/// Bounds `value` to `max` characters.
///
/// An over-long value keeps its first `max - 1` characters and gains
/// [`TRUNCATION_MARKER`], so the result is exactly `max` characters long.
///
/// # Examples
///
/// ```
/// use proofread::sanitize::truncate;
///
/// assert_eq!(truncate("あいうえお", 3), "あい…");
/// assert_eq!(truncate("あいう", 3), "あいう");
/// ```
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out: String = value.chars().take(max - 1).collect();
    out.push(TRUNCATION_MARKER);
    out
}

/// Per-field maximum lengths, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub corrected_text: usize,
    pub summary: usize,
    pub details: usize,
}

impl FieldLimits {
    pub const DEFAULT: Self = Self {
        corrected_text: 10_000,
        summary: 400,
        details: 4_000,
    };
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Sanitizes then truncates every field of the contract.
pub fn bound_contract(contract: &OutputContract, limits: &FieldLimits) -> OutputContract {
    OutputContract {
        corrected_text: truncate(&sanitize_html(&contract.corrected_text), limits.corrected_text),
        summary: truncate(&sanitize_html(&contract.summary), limits.summary),
        details: truncate(&sanitize_html(&contract.details), limits.details),
    }
}
