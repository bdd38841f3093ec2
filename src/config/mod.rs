//! Settings of the locales pipeline.
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Source file classification
mod matcher;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    ConfigError,
    CsvConfig,
    IndexingConfig,
    LocalesSettings,
    MessageFormatConfig,
    SanitizerConfig,
    ValidationError,
};
