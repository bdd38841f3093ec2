//! Fan-out scanning of source files and the working message set.

use std::collections::BTreeSet;
use std::path::{
    Path,
    PathBuf,
};

use futures::StreamExt;

use super::log_message_error;
use crate::config::FileMatcher;
use crate::indexer::display_path;
use crate::input::source::SourceFile;
use crate::sanitize::{
    Sanitizer,
    sanitize_message,
};
use crate::store::{
    MergeMode,
    MessageEntry,
    MessageStore,
};
use crate::syntax::{
    Candidate,
    extract_candidates,
};

/// Messages found in one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path as recorded in `files`.
    pub label: String,
    /// `(key, value)` pairs in source order.
    pub messages: Vec<(String, String)>,
}

/// Union of the messages of one refresh pass, before it is merged into the
/// locale stores.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    pub messages: MessageStore,
    /// Keys confirmed by the scanned sources, as opposed to default messages.
    pub scanned_keys: BTreeSet<String>,
}

impl WorkingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds default messages.
    pub fn seed(&mut self, defaults: &MessageStore) {
        self.messages.merge_all(defaults, MergeMode::Extend);
    }

    /// Adds the messages of a scanned file, attributed to that file.
    pub fn absorb(&mut self, file: ScannedFile) {
        for (key, value) in file.messages {
            self.messages.merge(&key, MessageEntry::from_file(value, &file.label), MergeMode::Extend);
            self.scanned_keys.insert(key);
        }
    }
}

/// Scans source files concurrently.
#[derive(Debug, Clone, Copy)]
pub struct SourceScanner<'a> {
    pub workspace_root: &'a Path,
    pub matcher: &'a FileMatcher,
    pub sanitizer: &'a dyn Sanitizer,
    pub localize_attributes: &'a [String],
    pub method_identifiers: &'a [String],
    /// Max files in flight.
    pub concurrency: usize,
}

impl SourceScanner<'_> {
    /// Scans every file, at most `concurrency` at a time, and returns once
    /// all of them are done (immediately for no files). Results keep the
    /// order of `files`.
    pub async fn scan(&self, files: &[PathBuf]) -> Vec<ScannedFile> {
        futures::stream::iter(files)
            .map(|path| self.scan_file(path))
            .buffered(self.concurrency.max(1))
            .collect()
            .await
    }

    /// Scans one file. Unreadable, unclassified and unparsable files yield
    /// no messages.
    pub async fn scan_file(&self, path: &Path) -> ScannedFile {
        let label = display_path(self.workspace_root, path);
        let mut scanned = ScannedFile { label, messages: Vec::new() };

        let Some(kind) = self.matcher.classify(path) else {
            tracing::warn!(file = %scanned.label, "Source file not matched as markup or script");
            return scanned;
        };
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %scanned.label, error = %e, "Failed to read source file");
                return scanned;
            }
        };
        let source = SourceFile { label: scanned.label.clone(), text, kind };

        let candidates = match extract_candidates(
            &source,
            self.localize_attributes,
            self.method_identifiers,
        ) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(file = %scanned.label, error = %e, "Failed to parse source file");
                return scanned;
            }
        };

        for candidate in candidates {
            let value = match candidate {
                Candidate::Text(value) => value,
                Candidate::Markup(raw) => {
                    match sanitize_message(self.sanitizer, &raw, &raw, false) {
                        Ok(sanitized) => sanitized.content,
                        Err(e) => {
                            log_message_error(&e.into(), &raw, None, &scanned.label);
                            continue;
                        }
                    }
                }
            };
            if !value.is_empty() {
                scanned.messages.push((value.clone(), value));
            }
        }

        tracing::info!("Parsed locales from {}", scanned.label);
        scanned
    }
}
