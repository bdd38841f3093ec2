//! Export: write every store as a CSV table.

use super::{
    LocaleOutcome,
    LocalesPipeline,
    OutcomeStatus,
    PipelineError,
    TaskTarget,
};
use crate::exchange::export_csv;
use crate::store::{
    load_message_document,
    write_text,
};

impl LocalesPipeline {
    /// Writes one CSV table per store file matched by the target.
    ///
    /// # Errors
    /// Returns `PipelineError` for a missing destination, a path without
    /// locale, an unreadable store or a failed write.
    pub async fn export(&self, target: &TaskTarget) -> Result<Vec<LocaleOutcome>, PipelineError> {
        let destination = target.destination()?;
        let selection = self.select_sources(target)?;

        let mut outcomes = Vec::with_capacity(selection.files.len());
        for file in &selection.files {
            let locale = self.locale_from_path(file)?;
            let store = load_message_document(file).await?;
            tracing::info!("Parsed locales from {}", self.label(file));

            let path = self.destination_path(destination, &locale);
            let table = export_csv(&store, &locale, &self.settings.csv)
                .map_err(|source| PipelineError::Exchange { path: path.clone(), source })?;
            write_text(&path, &table).await?;
            tracing::info!(locale = %locale, "Exported locales to {}", self.label(&path));
            outcomes.push(LocaleOutcome { locale, path, status: OutcomeStatus::Exported });
        }
        Ok(outcomes)
    }
}
