//! HTML sanitizing of message content and escaping of keys for code.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

use ammonia::UrlRelative;
use regex::Regex;
use thiserror::Error;

use crate::config::LocalesSettings;
use crate::syntax::{
    AnalyzerError,
    first_error_position,
    html,
};
use crate::types::SourcePosition;

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("Invalid markup at line {}, column {}", position.line, position.column)]
    InvalidMarkup { position: SourcePosition },
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

impl SanitizeError {
    /// Location of the problem inside the sanitized content, if known.
    #[must_use]
    pub const fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::InvalidMarkup { position } => Some(*position),
            Self::Analyzer(AnalyzerError::Syntax { position }) => Some(*position),
            Self::Analyzer(_) => None,
        }
    }
}

/// Cleans untrusted markup before it is stored or compiled.
pub trait Sanitizer: Send + Sync + fmt::Debug {
    /// Returns the cleaned form of `content`.
    ///
    /// # Errors
    /// Returns `SanitizeError` when the content is rejected.
    fn sanitize(&self, content: &str) -> Result<String, SanitizeError>;
}

/// Sanitizer backed by `ammonia`, allowing only URLs matching the configured
/// pattern in `href` and `src`.
pub struct HtmlSanitizer {
    cleaner: ammonia::Builder<'static>,
    collapse_whitespace: Option<Regex>,
    reject_invalid_markup: bool,
}

impl fmt::Debug for HtmlSanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlSanitizer")
            .field("collapse_whitespace", &self.collapse_whitespace.is_some())
            .field("reject_invalid_markup", &self.reject_invalid_markup)
            .finish_non_exhaustive()
    }
}

impl HtmlSanitizer {
    /// # Errors
    /// Returns `regex::Error` if `urlPattern` is not a valid regex.
    pub fn from_settings(settings: &LocalesSettings) -> Result<Self, regex::Error> {
        let url_pattern = Regex::new(&settings.url_pattern)?;
        let collapse_whitespace =
            if settings.sanitizer.collapse_whitespace { Some(Regex::new(r"\s+")?) } else { None };

        let mut cleaner = ammonia::Builder::default();
        cleaner
            .link_rel(None)
            .url_schemes(HashSet::from(["ftp", "http", "https", "mailto"]))
            .url_relative(UrlRelative::PassThrough)
            .attribute_filter(move |_element, attribute, value| {
                if matches!(attribute, "href" | "src") && !url_pattern.is_match(value) {
                    return None;
                }
                Some(Cow::Borrowed(value))
            });

        Ok(Self {
            cleaner,
            collapse_whitespace,
            reject_invalid_markup: settings.sanitizer.reject_invalid_markup,
        })
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, content: &str) -> Result<String, SanitizeError> {
        let content = match &self.collapse_whitespace {
            Some(whitespace) => whitespace.replace_all(content, " ").trim().to_string(),
            None => content.to_string(),
        };
        if self.reject_invalid_markup {
            let tree = html::parse(&content)?;
            if tree.root_node().has_error() {
                let position = first_error_position(tree.root_node());
                return Err(SanitizeError::InvalidMarkup { position });
            }
        }
        Ok(self.cleaner.clean(&content).to_string())
    }
}

/// Key and content after sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedMessage {
    pub key: String,
    pub content: String,
}

/// Sanitizes `content`, escaping `key` for a quoted script context when
/// `escape_key` is set.
///
/// # Errors
/// Returns `SanitizeError` when the sanitizer rejects the content.
pub fn sanitize_message(
    sanitizer: &dyn Sanitizer,
    key: &str,
    content: &str,
    escape_key: bool,
) -> Result<SanitizedMessage, SanitizeError> {
    let key = if escape_key { js_escape(key) } else { key.to_string() };
    let content = sanitizer.sanitize(content)?;
    Ok(SanitizedMessage { key, content })
}

/// Escapes a string for a quoted script literal that may itself sit inside
/// markup: control characters, quotes, backslash, `<`, `>` and `&` become
/// `\xHH`.
#[must_use]
pub fn js_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if u32::from(ch) < 32 || matches!(ch, '"' | '\'' | '\\' | '<' | '>' | '&') {
            let _ = write!(escaped, "\\x{:02x}", u32::from(ch));
        } else {
            escaped.push(ch);
        }
    }
    escaped
}
