//! The four pipeline operations over the per-locale message stores.
//!
//! - `refresh`: scan sources, merge into every locale store, purge unseen keys
//! - `compile`: turn stores into locale artifacts with formatting functions
//! - `export`: write stores as CSV tables for translators
//! - `import`: merge translated CSV tables back into existing stores

mod compile;
mod error;
mod export;
mod import;
mod refresh;
mod scanner;

use std::fmt;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

pub use compile::CompiledFunction;
pub use error::{
    MessageError,
    PipelineError,
};
use regex::Regex;
pub use scanner::{
    ScannedFile,
    SourceScanner,
    WorkingSet,
};

use crate::config::{
    ConfigError,
    FileMatcher,
    LocalesSettings,
};
use crate::format::FormatterCache;
use crate::indexer::{
    display_path,
    find_files,
};
use crate::sanitize::{
    HtmlSanitizer,
    SanitizedMessage,
    Sanitizer,
    sanitize_message,
};
use crate::syntax::html;

/// Sources and destination of one operation.
#[derive(Debug, Clone, Default)]
pub struct TaskTarget {
    /// Globs expanded below the workspace root.
    pub sources: Vec<String>,
    /// Explicit files. When non-empty they replace `sources` and the run is
    /// restricted: nothing is purged. Excluded files are still skipped.
    pub files: Vec<PathBuf>,
    /// Output path template containing the locale placeholder.
    pub destination: Option<String>,
}

impl TaskTarget {
    #[must_use]
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { sources: sources.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    fn destination(&self) -> Result<&str, PipelineError> {
        self.destination.as_deref().filter(|d| !d.is_empty()).ok_or(PipelineError::MissingDestination)
    }
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Created,
    Updated,
    Exported,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Updated => write!(f, "Updated"),
            Self::Exported => write!(f, "Exported"),
        }
    }
}

/// An output file written for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleOutcome {
    pub locale: String,
    pub path: PathBuf,
    pub status: OutcomeStatus,
}

/// Files an operation works on.
#[derive(Debug)]
struct SourceSelection {
    files: Vec<PathBuf>,
    /// An explicit file list was given.
    restricted: bool,
}

/// Runs pipeline operations for one workspace.
#[derive(Debug)]
pub struct LocalesPipeline {
    settings: LocalesSettings,
    workspace_root: PathBuf,
    matcher: FileMatcher,
    locale_pattern: Regex,
    sanitizer: Arc<dyn Sanitizer>,
    formatters: FormatterCache,
}

impl LocalesPipeline {
    /// Validates `settings` and prepares the collaborators of the pipeline.
    ///
    /// # Errors
    /// Returns `PipelineError::NoLocales` when no locale is configured, or
    /// the validation error of any other invalid setting.
    pub fn new(workspace_root: PathBuf, settings: LocalesSettings) -> Result<Self, PipelineError> {
        if settings.locales.is_empty() {
            return Err(PipelineError::NoLocales);
        }
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        let matcher = FileMatcher::new(workspace_root.clone(), &settings)?;
        let locale_pattern = Regex::new(&settings.locale_pattern)?;
        let sanitizer = Arc::new(HtmlSanitizer::from_settings(&settings)?);
        let formatters = FormatterCache::new(
            workspace_root.clone(),
            settings.message_format.clone(),
            settings.locale_placeholder.clone(),
        );

        Ok(Self { settings, workspace_root, matcher, locale_pattern, sanitizer, formatters })
    }

    /// Replaces the markup sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &LocalesSettings {
        &self.settings
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Expands the target sources, or checks its explicit files.
    fn select_sources(&self, target: &TaskTarget) -> Result<SourceSelection, PipelineError> {
        if target.files.is_empty() {
            let files = find_files(
                &self.workspace_root,
                &target.sources,
                &self.settings.exclude_patterns,
            )?;
            return Ok(SourceSelection { files, restricted: false });
        }

        let files = target
            .files
            .iter()
            .map(|file| self.workspace_root.join(file))
            .filter(|file| {
                if !file.is_file() {
                    tracing::warn!(file = %file.display(), "Source file not found");
                    return false;
                }
                if self.matcher.is_excluded(file) {
                    tracing::debug!(file = %file.display(), "Skipping excluded file");
                    return false;
                }
                true
            })
            .collect();
        Ok(SourceSelection { files, restricted: true })
    }

    /// Output path for `locale`.
    fn destination_path(&self, template: &str, locale: &str) -> PathBuf {
        self.workspace_root.join(template.replace(&self.settings.locale_placeholder, locale))
    }

    /// Path of a file as recorded in stores and logs.
    fn label(&self, path: &Path) -> String {
        display_path(&self.workspace_root, path)
    }

    /// Locale named by a store path: capture group 1 of the locale pattern,
    /// or the whole match.
    fn locale_from_path(&self, path: &Path) -> Result<String, PipelineError> {
        let label = self.label(path);
        self.locale_pattern
            .captures(&label)
            .and_then(|captures| captures.get(1).or_else(|| captures.get(0)))
            .map(|locale| locale.as_str().to_string())
            .filter(|locale| !locale.is_empty())
            .ok_or_else(|| PipelineError::LocaleNotMatched {
                pattern: self.locale_pattern.as_str().to_string(),
                path: label,
            })
    }

    /// Sanitizes a stored or imported value, keeping the original text when
    /// the sanitized markup reads the same.
    fn prepare_content(
        &self,
        key: &str,
        value: &str,
        escape_key: bool,
    ) -> Result<SanitizedMessage, MessageError> {
        let mut sanitized = sanitize_message(self.sanitizer.as_ref(), key, value, escape_key)?;
        let text = html::text_content(&sanitized.content)?;
        if text == value {
            sanitized.content = text;
        }
        Ok(sanitized)
    }
}

/// Logs a message that is skipped.
fn log_message_error(error: &MessageError, key: &str, locale: Option<&str>, file: &str) {
    let position = error.position();
    tracing::warn!(
        error = error.name(),
        reason = %error,
        line = position.map(|p| p.line),
        column = position.map(|p| p.column),
        key = %key.replace('\n', "\\n"),
        locale,
        file,
        "Skipping message"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    fn pipeline(root: &Path) -> LocalesPipeline {
        LocalesPipeline::new(root.to_path_buf(), LocalesSettings::default()).unwrap()
    }

    #[rstest]
    fn new_without_locales_is_fatal() {
        let settings = LocalesSettings { locales: vec![], ..LocalesSettings::default() };

        let result = LocalesPipeline::new(PathBuf::from("/workspace"), settings);

        assert!(matches!(result, Err(PipelineError::NoLocales)));
    }

    #[rstest]
    fn new_with_invalid_settings_is_config_error() {
        let settings =
            LocalesSettings { locale_pattern: "(".to_string(), ..LocalesSettings::default() };

        let result = LocalesPipeline::new(PathBuf::from("/workspace"), settings);

        assert!(matches!(result, Err(PipelineError::Config(ConfigError::ValidationErrors(_)))));
    }

    #[rstest]
    #[case::group("locale/en_US/i18n.json", "en_US")]
    #[case::nested("app/js/locale/de_DE/i18n.json", "de_DE")]
    fn locale_from_path_uses_capture_group(#[case] path: &str, #[case] expected: &str) {
        let pipeline = pipeline(Path::new("/workspace"));

        let locale = pipeline.locale_from_path(&Path::new("/workspace").join(path)).unwrap();

        assert_that!(locale, eq(expected));
    }

    #[rstest]
    fn locale_from_path_without_group_uses_whole_match() {
        let settings = LocalesSettings {
            locale_pattern: r"[a-z]{2}_[A-Z]{2}".to_string(),
            ..LocalesSettings::default()
        };
        let pipeline = LocalesPipeline::new(PathBuf::from("/workspace"), settings).unwrap();

        let locale = pipeline.locale_from_path(Path::new("/workspace/po-fr_FR.json")).unwrap();

        assert_that!(locale, eq("fr_FR"));
    }

    #[rstest]
    fn locale_from_path_without_match_is_fatal() {
        let pipeline = pipeline(Path::new("/workspace"));

        let result = pipeline.locale_from_path(Path::new("/workspace/i18n.json"));

        assert!(matches!(result, Err(PipelineError::LocaleNotMatched { .. })));
    }

    #[rstest]
    fn destination_path_replaces_placeholder() {
        let pipeline = pipeline(Path::new("/workspace"));

        let path = pipeline.destination_path("locale/{locale}/i18n.json", "en_US");

        assert_eq!(path, PathBuf::from("/workspace/locale/en_US/i18n.json"));
    }

    #[rstest]
    fn missing_destination_is_fatal() {
        let target = TaskTarget::new(["**/*.js"]);

        assert!(matches!(target.destination(), Err(PipelineError::MissingDestination)));
    }

    #[rstest]
    fn select_sources_skips_missing_explicit_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.js"), "").unwrap();
        let pipeline = pipeline(temp_dir.path());
        let target = TaskTarget::new(["**/*.js"]).with_files(["a.js", "missing.js"]);

        let selection = pipeline.select_sources(&target).unwrap();

        assert_that!(selection.restricted, eq(true));
        assert_eq!(selection.files, vec![temp_dir.path().join("a.js")]);
    }

    #[rstest]
    fn select_sources_skips_excluded_explicit_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("node_modules")).unwrap();
        std::fs::write(temp_dir.path().join("node_modules/lib.js"), "").unwrap();
        let pipeline = pipeline(temp_dir.path());
        let target = TaskTarget::new(["**/*.js"]).with_files(["node_modules/lib.js"]);

        let selection = pipeline.select_sources(&target).unwrap();

        assert!(selection.files.is_empty());
    }

    #[rstest]
    #[case::plain_text("Fish & Chips", "Fish & Chips")]
    #[case::markup_kept("Hello <b>World</b>", "Hello <b>World</b>")]
    #[case::entity_kept_as_markup("a &lt; b", "a &lt; b")]
    fn prepare_content_prefers_plain_text(#[case] value: &str, #[case] expected: &str) {
        let pipeline = pipeline(Path::new("/workspace"));

        let prepared = pipeline.prepare_content(value, value, true).unwrap();

        assert_that!(prepared.content, eq(expected));
    }
}
