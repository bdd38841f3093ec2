//! Refresh: scan sources and reconcile every locale store.

use std::path::PathBuf;

use super::{
    LocaleOutcome,
    LocalesPipeline,
    OutcomeStatus,
    PipelineError,
    SourceScanner,
    TaskTarget,
    WorkingSet,
};
use crate::indexer::find_files;
use crate::store::{
    MergeMode,
    load_message_document,
    load_store,
    write_store,
};

impl LocalesPipeline {
    pub(crate) fn scanner(&self) -> SourceScanner<'_> {
        SourceScanner {
            workspace_root: &self.workspace_root,
            matcher: &self.matcher,
            sanitizer: self.sanitizer.as_ref(),
            localize_attributes: &self.settings.localize_attributes,
            method_identifiers: &self.settings.localize_method_identifiers,
            concurrency: self.settings.indexing.effective_threads(),
        }
    }

    /// Builds the working set: default messages first, then every scanned
    /// source file.
    ///
    /// # Errors
    /// Returns `PipelineError` if a default message document is unreadable.
    pub async fn collect_messages(&self, files: &[PathBuf]) -> Result<WorkingSet, PipelineError> {
        let mut working_set = WorkingSet::new();

        let default_files =
            find_files(&self.workspace_root, &self.settings.default_messages_source, &[])?;
        for file in default_files {
            let defaults = load_message_document(&file).await?;
            working_set.seed(&defaults);
            tracing::info!("Parsed locales from {}", self.label(&file));
        }

        for scanned in self.scanner().scan(files).await {
            working_set.absorb(scanned);
        }
        Ok(working_set)
    }

    /// Scans the target sources and merges the result into the store of
    /// every configured locale.
    ///
    /// Existing values are never overwritten. On a full run with
    /// `purgeLocales`, keys missing from the scan are removed; keys only
    /// known from default messages survive unless `purgeDefaultMessages`
    /// is set. An explicit file list never purges.
    ///
    /// # Errors
    /// Returns `PipelineError` for a missing destination, an unreadable
    /// store or a failed write.
    pub async fn refresh(&self, target: &TaskTarget) -> Result<Vec<LocaleOutcome>, PipelineError> {
        let destination = target.destination()?;
        let selection = self.select_sources(target)?;
        let purge = self.settings.purge_locales && !selection.restricted;

        let working_set = self.collect_messages(&selection.files).await?;

        let mut outcomes = Vec::with_capacity(self.settings.locales.len());
        for locale in &self.settings.locales {
            let path = self.destination_path(destination, locale);
            let existing = load_store(&path).await?;
            let status =
                if existing.is_some() { OutcomeStatus::Updated } else { OutcomeStatus::Created };
            if existing.is_some() {
                tracing::info!("Parsed locales from {}", self.label(&path));
            }

            let mut store = existing.unwrap_or_default();
            store.merge_all(&working_set.messages, MergeMode::Extend);
            if purge {
                if self.settings.purge_default_messages {
                    store.retain_keys(|key| working_set.scanned_keys.contains(key));
                } else {
                    store.retain_keys(|key| working_set.messages.contains_key(key));
                }
            }

            write_store(&path, &store, self.settings.json_space).await?;
            tracing::info!(locale = %locale, "{status} locale file {}", self.label(&path));
            outcomes.push(LocaleOutcome { locale: locale.clone(), path, status });
        }
        Ok(outcomes)
    }
}
