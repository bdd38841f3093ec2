//! Indexer type definitions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// An include or exclude glob failed to compile
    #[error("Invalid source pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// The compiled globs could not be combined
    #[error("Failed to build source patterns: {0}")]
    GlobSetBuild(#[from] globset::Error),
}
