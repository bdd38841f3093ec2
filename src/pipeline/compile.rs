//! Compile: turn locale stores into script artifacts.

use std::sync::Arc;

use askama::Template;
use serde::Serialize;

use super::{
    LocaleOutcome,
    LocalesPipeline,
    MessageError,
    OutcomeStatus,
    PipelineError,
    TaskTarget,
    log_message_error,
};
use crate::format::{
    MessageFormatter,
    ResourceKind,
    read_resource,
};
use crate::store::{
    MessageStore,
    load_message_document,
    write_text,
};

/// A message that needs a formatting function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledFunction {
    /// Key escaped for a quoted script string.
    pub key: String,
    /// `function(d){ ... }` source.
    pub body: String,
}

/// The locale artifact registering its formatting functions on `window`.
///
/// The same fields are the context of a user `localeTemplate`.
#[derive(Template, Serialize)]
#[template(path = "i18n.js.jinja", escape = "none")]
struct LocaleArtifact<'a> {
    /// Locale identifier the artifact is built for.
    locale: &'a str,
    /// Global namespace object.
    locale_name: &'a str,
    /// Plural rules of the locale's language.
    locale_runtime: &'a str,
    /// Helper code shared by every locale, possibly empty.
    shared_runtime: &'a str,
    /// Functions in key order.
    functions: &'a [CompiledFunction],
}

/// Layout of the artifact: the built-in template or a user template source.
#[derive(Debug)]
enum ArtifactLayout {
    /// `templates/i18n.js.jinja`, compiled in.
    BuiltIn,
    /// Source of the configured `localeTemplate`.
    Custom(String),
}

impl ArtifactLayout {
    /// Renders `artifact`, always ending with one newline.
    fn render(&self, artifact: &LocaleArtifact<'_>) -> Result<String, PipelineError> {
        let rendered = match self {
            Self::BuiltIn => artifact.render()?,
            Self::Custom(source) => minijinja::Environment::new().render_str(source, artifact)?,
        };
        Ok(format!("{}\n", rendered.trim_end()))
    }
}

impl LocalesPipeline {
    /// Loads the configured `localeTemplate`, if any.
    async fn artifact_layout(&self) -> Result<ArtifactLayout, PipelineError> {
        match &self.settings.locale_template {
            Some(file) => {
                let path = self.workspace_root.join(file);
                let source = read_resource(ResourceKind::LocaleTemplate, &path).await?;
                Ok(ArtifactLayout::Custom(source))
            }
            None => Ok(ArtifactLayout::BuiltIn),
        }
    }

    /// Compiles one message. `Ok(None)` means the key itself can be shown
    /// as is: the unescaped key equals its content and has no placeholders.
    ///
    /// # Errors
    /// Returns `MessageError` when sanitizing or parsing the value fails.
    pub fn compile_message(
        &self,
        formatter: &MessageFormatter,
        key: &str,
        value: &str,
    ) -> Result<Option<CompiledFunction>, MessageError> {
        let prepared = self.prepare_content(key, value, true)?;
        if key == prepared.content && !prepared.content.contains('{') {
            return Ok(None);
        }
        let message = formatter.parse(&prepared.content)?;
        Ok(Some(CompiledFunction { key: prepared.key, body: formatter.precompile(&message) }))
    }

    /// Compiles every message of a store in key order, logging and skipping
    /// the ones that fail.
    #[must_use]
    pub fn compile_store(
        &self,
        formatter: &MessageFormatter,
        store: &MessageStore,
        locale: &str,
        file: &str,
    ) -> Vec<CompiledFunction> {
        store
            .iter()
            .filter_map(|(key, entry)| {
                match self.compile_message(formatter, key, &entry.value) {
                    Ok(function) => function,
                    Err(e) => {
                        log_message_error(&e, key, Some(locale), file);
                        None
                    }
                }
            })
            .collect()
    }

    /// Writes one artifact per store file matched by the target. The locale
    /// of a store is read from its path.
    ///
    /// # Errors
    /// Returns `PipelineError` for a missing destination, grammar resource
    /// or locale template, a path without locale, or an I/O failure.
    pub async fn compile(
        &mut self,
        target: &TaskTarget,
    ) -> Result<Vec<LocaleOutcome>, PipelineError> {
        let destination = target.destination()?;
        let selection = self.select_sources(target)?;
        let shared_runtime = self.formatters.shared_runtime().await?;
        let layout = self.artifact_layout().await?;

        let mut outcomes = Vec::with_capacity(selection.files.len());
        for file in &selection.files {
            let locale = self.locale_from_path(file)?;
            let label = self.label(file);
            let store = load_message_document(file).await?;
            let formatter: Arc<MessageFormatter> = self.formatters.formatter(&locale).await?;

            let functions = self.compile_store(&formatter, &store, &locale, &label);
            tracing::info!("Parsed locales from {label}");

            let artifact = layout.render(&LocaleArtifact {
                locale: &locale,
                locale_name: &self.settings.locale_name,
                locale_runtime: formatter.locale_runtime().trim_end(),
                shared_runtime: shared_runtime.trim_end(),
                functions: &functions,
            })?;

            let path = self.destination_path(destination, &locale);
            write_text(&path, &artifact).await?;
            tracing::info!(locale = %locale, "Updated locale file {}", self.label(&path));
            outcomes.push(LocaleOutcome { locale, path, status: OutcomeStatus::Updated });
        }
        Ok(outcomes)
    }
}
