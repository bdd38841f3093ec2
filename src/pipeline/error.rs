//! Errors of the pipeline operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{
    ConfigError,
    MatcherError,
};
use crate::exchange::ExchangeError;
use crate::format::{
    FormatError,
    ResourceError,
};
use crate::indexer::DiscoveryError;
use crate::sanitize::SanitizeError;
use crate::store::StoreError;
use crate::syntax::AnalyzerError;
use crate::types::SourcePosition;

/// Conditions that abort an operation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No locales defined")]
    NoLocales,

    #[error("Missing destination file path")]
    MissingDestination,

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("Regular expression '{pattern}' failed to match locale in path '{path}'")]
    LocaleNotMatched { pattern: String, path: String },

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to export '{}': {source}", path.display())]
    Exchange {
        path: PathBuf,
        #[source]
        source: ExchangeError,
    },

    #[error("Failed to render locale artifact: {0}")]
    Template(#[from] askama::Error),

    #[error("Failed to render locale template: {0}")]
    LocaleTemplate(#[from] minijinja::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// A failure confined to one message; it is logged and the message skipped.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl MessageError {
    /// Short error class name shown in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sanitize(_) => "SanitizeError",
            Self::Analyzer(_) => "AnalyzerError",
            Self::Format(error) => error.name,
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::Sanitize(error) => error.position(),
            Self::Analyzer(AnalyzerError::Syntax { position }) => Some(*position),
            Self::Analyzer(_) => None,
            Self::Format(error) => Some(SourcePosition::new(error.line, error.column)),
        }
    }
}
