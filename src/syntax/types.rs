//! Types for the syntax module

use thiserror::Error;

use crate::types::SourcePosition;

/// A message candidate found at an extraction site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Final text: an explicit attribute value or an evaluated string literal
    Text(String),
    /// Raw element content that still has to pass the sanitizer
    Markup(String),
}

/// Defines errors that may occur while reading a source artifact
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error when failing to set the language for the parser
    #[error("Failed to set language for parser: {0}")]
    LanguageSetup(#[from] tree_sitter::LanguageError),
    /// Error when the parser gives up on the input
    #[error("Failed to parse source code")]
    ParseFailed,
    /// The source does not tokenize
    #[error("Unexpected token at line {}, column {}", position.line, position.column)]
    Syntax { position: SourcePosition },
    /// A string literal could not be evaluated
    #[error(transparent)]
    Literal(#[from] super::literal::LiteralError),
}
