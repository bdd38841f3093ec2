//! js-i18n-locales
//!
//! Extracts translatable messages from HTML and script sources into
//! per-locale JSON stores, compiles the stores into JavaScript locale
//! artifacts and exchanges them with translators as CSV tables.

pub mod config;
pub mod exchange;
pub mod format;
pub mod indexer;
pub mod input;
pub mod pipeline;
pub mod sanitize;
pub mod store;
pub mod syntax;
pub mod types;

pub use pipeline::{
    LocaleOutcome,
    LocalesPipeline,
    OutcomeStatus,
    PipelineError,
    TaskTarget,
};
