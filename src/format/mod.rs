//! Message format grammar: parsing, precompiling, and the per-language
//! formatter cache with its grammar resources.

pub mod codegen;
pub mod parser;

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

pub use parser::Message;
use thiserror::Error;

use crate::config::MessageFormatConfig;

/// Error raised by the grammar, positioned inside the message (1-indexed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message} (line {line}, column {column})")]
pub struct FormatError {
    pub name: &'static str,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl FormatError {
    #[must_use]
    pub const fn syntax(message: String, line: u32, column: u32) -> Self {
        Self { name: "SyntaxError", message, line, column }
    }
}

/// Which compile resource a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    LocaleGrammar,
    SharedRuntime,
    /// User template replacing the built-in artifact layout.
    LocaleTemplate,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocaleGrammar => write!(f, "MessageFormat locale file"),
            Self::SharedRuntime => write!(f, "MessageFormat shared file"),
            Self::LocaleTemplate => write!(f, "Locale template"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{kind} '{}' not found", path.display())]
    Missing { kind: ResourceKind, path: PathBuf },
    #[error("Failed to read {kind} '{}': {source}", path.display())]
    Read {
        kind: ResourceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Language part of a locale identifier: its first two characters.
#[must_use]
pub fn language_of(locale: &str) -> &str {
    locale.char_indices().nth(2).map_or(locale, |(end, _)| locale.get(..end).unwrap_or(locale))
}

/// Parser and compiler bound to one language and its grammar definition.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    language: String,
    locale_runtime: String,
}

impl MessageFormatter {
    #[must_use]
    pub fn new(language: impl Into<String>, locale_runtime: impl Into<String>) -> Self {
        Self { language: language.into(), locale_runtime: locale_runtime.into() }
    }

    /// Script source defining `MessageFormat.locale[language]`.
    #[must_use]
    pub fn locale_runtime(&self) -> &str {
        &self.locale_runtime
    }

    /// # Errors
    /// Returns `FormatError` if `source` is not a valid message.
    pub fn parse(&self, source: &str) -> Result<Message, FormatError> {
        parser::parse(source)
    }

    #[must_use]
    pub fn precompile(&self, message: &Message) -> String {
        codegen::precompile(message, &self.language)
    }
}

/// Formatters keyed by language, each created once per run from its grammar
/// definition file.
#[derive(Debug)]
pub struct FormatterCache {
    workspace_root: PathBuf,
    config: MessageFormatConfig,
    placeholder: String,
    formatters: HashMap<String, Arc<MessageFormatter>>,
}

impl FormatterCache {
    #[must_use]
    pub fn new(workspace_root: PathBuf, config: MessageFormatConfig, placeholder: String) -> Self {
        Self { workspace_root, config, placeholder, formatters: HashMap::new() }
    }

    /// Path of the grammar definition for `locale`.
    #[must_use]
    pub fn locale_file(&self, locale: &str) -> PathBuf {
        let file = self.config.locale_file.replace(&self.placeholder, language_of(locale));
        self.workspace_root.join(file)
    }

    /// Returns the formatter for the language of `locale`, loading its
    /// grammar definition on first use.
    ///
    /// # Errors
    /// Returns `ResourceError` if the grammar definition is missing.
    pub async fn formatter(&mut self, locale: &str) -> Result<Arc<MessageFormatter>, ResourceError> {
        let language = language_of(locale);
        if let Some(formatter) = self.formatters.get(language) {
            return Ok(Arc::clone(formatter));
        }
        let path = self.locale_file(locale);
        let locale_runtime = read_resource(ResourceKind::LocaleGrammar, &path).await?;
        tracing::debug!(language, path = %path.display(), "Loaded message format grammar");
        let formatter = Arc::new(MessageFormatter::new(language, locale_runtime));
        self.formatters.insert(language.to_string(), Arc::clone(&formatter));
        Ok(formatter)
    }

    /// Contents of the shared runtime helper, empty when none is configured.
    ///
    /// # Errors
    /// Returns `ResourceError` if a configured file is missing.
    pub async fn shared_runtime(&self) -> Result<String, ResourceError> {
        match &self.config.shared_file {
            Some(file) => {
                read_resource(ResourceKind::SharedRuntime, &self.workspace_root.join(file)).await
            }
            None => Ok(String::new()),
        }
    }
}

/// Reads a required resource. A missing file is reported as such.
pub(crate) async fn read_resource(kind: ResourceKind, path: &Path) -> Result<String, ResourceError> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ResourceError::Missing { kind, path: path.to_path_buf() }
        } else {
            ResourceError::Read { kind, path: path.to_path_buf(), source }
        }
    })
}
