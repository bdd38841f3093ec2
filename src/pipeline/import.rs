//! Import: merge translated CSV tables back into existing stores.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;

use super::{
    LocaleOutcome,
    LocalesPipeline,
    MessageError,
    OutcomeStatus,
    PipelineError,
    TaskTarget,
    log_message_error,
};
use crate::config::CsvConfig;
use crate::exchange::{
    CsvRow,
    ExchangeError,
    read_csv,
};
use crate::format::MessageFormatter;
use crate::store::{
    MergeMode,
    MessageEntry,
    load_store,
    write_store,
};

/// Validated translations per locale. A later row for the same key wins.
type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// Reads and parses one CSV file.
async fn read_table(
    path: &Path,
    config: &CsvConfig,
) -> Result<Vec<CsvRow>, ExchangeError> {
    let bytes = tokio::fs::read(path).await?;
    read_csv(bytes.as_slice(), config)
}

impl LocalesPipeline {
    /// Sanitizes and validates one translated cell. `Ok(None)` means the
    /// cell sanitizes to nothing.
    ///
    /// # Errors
    /// Returns `MessageError` when sanitizing or parsing fails.
    pub fn validate_translation(
        &self,
        formatter: &MessageFormatter,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, MessageError> {
        let prepared = self.prepare_content(key, value, false)?;
        if prepared.content.is_empty() {
            return Ok(None);
        }
        formatter.parse(&prepared.content)?;
        Ok(Some(prepared.content))
    }

    /// Collects the valid cells of one table into `translations`.
    fn collect_rows(
        &self,
        rows: &[CsvRow],
        formatters: &HashMap<String, Arc<MessageFormatter>>,
        file: &str,
        translations: &mut Translations,
    ) {
        let key_label = &self.settings.csv.key_label;
        for row in rows {
            let Some(key) = row.get(key_label) else {
                continue;
            };
            for (locale, formatter) in formatters {
                let Some(value) = row.get(locale).filter(|value| !value.is_empty()) else {
                    continue;
                };
                match self.validate_translation(formatter, key, value) {
                    Ok(Some(content)) => {
                        translations
                            .entry(locale.clone())
                            .or_default()
                            .insert(key.clone(), content);
                    }
                    Ok(None) => {}
                    Err(e) => log_message_error(&e, key, Some(locale), file),
                }
            }
        }
    }

    /// Merges CSV tables matched by the target into the existing stores of
    /// the configured locales. Only values of keys already present in a
    /// store are replaced; stores that do not exist are left alone.
    ///
    /// # Errors
    /// Returns `PipelineError` for a missing destination or grammar
    /// resource, an unreadable store or a failed write.
    pub async fn import(
        &mut self,
        target: &TaskTarget,
    ) -> Result<Vec<LocaleOutcome>, PipelineError> {
        let destination = target.destination()?;
        let selection = self.select_sources(target)?;
        if selection.files.is_empty() {
            tracing::warn!("No import source file found");
            return Ok(Vec::new());
        }

        let mut formatters = HashMap::with_capacity(self.settings.locales.len());
        for locale in &self.settings.locales {
            let formatter = self.formatters.formatter(locale).await?;
            formatters.insert(locale.clone(), formatter);
        }

        let config = &self.settings.csv;
        let tables = join_all(selection.files.iter().map(|file| read_table(file, config))).await;

        let mut translations = Translations::new();
        for (file, table) in selection.files.iter().zip(tables) {
            let label = self.label(file);
            match table {
                Ok(rows) => {
                    self.collect_rows(&rows, &formatters, &label, &mut translations);
                    tracing::info!("Parsed locales from {label}");
                }
                Err(e) => tracing::warn!(file = %label, error = %e, "Skipping unreadable CSV file"),
            }
        }

        self.write_translations(destination, translations).await
    }

    /// Merges the translations of each locale into its existing store.
    async fn write_translations(
        &self,
        destination: &str,
        translations: Translations,
    ) -> Result<Vec<LocaleOutcome>, PipelineError> {
        let mut outcomes = Vec::with_capacity(translations.len());
        for (locale, messages) in translations {
            let path = self.destination_path(destination, &locale);
            let Some(mut store) = load_store(&path).await? else {
                tracing::warn!("Import target file {} not found", self.label(&path));
                continue;
            };
            for (key, value) in messages {
                store.merge(&key, MessageEntry::new(value), MergeMode::Update);
            }
            write_store(&path, &store, self.settings.json_space).await?;
            tracing::info!(locale = %locale, "Updated locale file {}", self.label(&path));
            outcomes.push(LocaleOutcome { locale, path, status: OutcomeStatus::Updated });
        }
        Ok(outcomes)
    }
}
