//! File pattern matcher classifying source artifacts.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::LocalesSettings;
use crate::input::source::{
    ArtifactKind,
    ProgrammingLanguage,
};

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid markup file pattern '{pattern}': {source}")]
    InvalidMarkupPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid script file pattern '{pattern}': {source}")]
    InvalidScriptPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches files against the configured classification patterns.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    workspace_root: PathBuf,
    markup_set: GlobSet,
    script_set: GlobSet,
    exclude_set: GlobSet,
}

impl FileMatcher {
    /// Creates a new matcher from settings.
    pub fn new(workspace_root: PathBuf, settings: &LocalesSettings) -> Result<Self, MatcherError> {
        let markup_set = build_glob_set(&settings.markup_file_patterns, |pattern, source| {
            MatcherError::InvalidMarkupPattern { pattern, source }
        })?;

        let script_set = build_glob_set(&settings.script_file_patterns, |pattern, source| {
            MatcherError::InvalidScriptPattern { pattern, source }
        })?;

        let exclude_set = build_glob_set(&settings.exclude_patterns, |pattern, source| {
            MatcherError::InvalidExcludePattern { pattern, source }
        })?;

        Ok(Self { workspace_root, markup_set, script_set, exclude_set })
    }

    /// Path used for matching: relative to the workspace root when the path
    /// lies under it, unchanged otherwise.
    fn match_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.workspace_root).unwrap_or(path)
    }

    /// Classifies a source artifact. Markup patterns win over script patterns.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<ArtifactKind> {
        let relative = self.match_path(path);
        if self.markup_set.is_match(relative) {
            return Some(ArtifactKind::Markup);
        }
        if self.script_set.is_match(relative) {
            let language = ProgrammingLanguage::from_path(relative)
                .unwrap_or(ProgrammingLanguage::JavaScript);
            return Some(ArtifactKind::Script(language));
        }
        None
    }

    /// Returns true if the path matches `excludePatterns`.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude_set.is_match(self.match_path(path))
    }
}

/// Builds a glob set, mapping pattern errors with `make_error`.
fn build_glob_set<F>(patterns: &[String], make_error: F) -> Result<GlobSet, MatcherError>
where
    F: Fn(String, globset::Error) -> MatcherError,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| make_error(pattern.clone(), e))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;

    fn create_settings(markup: &[&str], script: &[&str], exclude: &[&str]) -> LocalesSettings {
        LocalesSettings {
            markup_file_patterns: markup.iter().map(ToString::to_string).collect(),
            script_file_patterns: script.iter().map(ToString::to_string).collect(),
            exclude_patterns: exclude.iter().map(ToString::to_string).collect(),
            ..LocalesSettings::default()
        }
    }

    #[rstest]
    #[case::html("/workspace/app/index.html", Some(ArtifactKind::Markup))]
    #[case::root_html("/workspace/index.html", Some(ArtifactKind::Markup))]
    #[case::js("/workspace/app/main.js", Some(ArtifactKind::Script(ProgrammingLanguage::JavaScript)))]
    #[case::ts("/workspace/app/main.ts", Some(ArtifactKind::Script(ProgrammingLanguage::TypeScript)))]
    #[case::tsx("/workspace/app/view.tsx", Some(ArtifactKind::Script(ProgrammingLanguage::Tsx)))]
    #[case::css("/workspace/app/style.css", None)]
    #[case::outside_root("/other/page.html", Some(ArtifactKind::Markup))]
    fn classify_with_default_patterns(#[case] path: &str, #[case] expected: Option<ArtifactKind>) {
        let settings = LocalesSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert_eq!(matcher.classify(Path::new(path)), expected);
    }

    #[rstest]
    fn classify_script_without_known_extension_defaults_to_javascript() {
        let settings = create_settings(&["**/*.html"], &["**/*.es"], &[]);
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert_eq!(
            matcher.classify(Path::new("/workspace/lib/app.es")),
            Some(ArtifactKind::Script(ProgrammingLanguage::JavaScript))
        );
    }

    #[rstest]
    fn is_excluded_with_default_pattern() {
        let settings = LocalesSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_excluded(Path::new("/workspace/node_modules/lib/index.js")));
        assert!(!matcher.is_excluded(Path::new("/workspace/src/index.js")));
    }

    #[rstest]
    fn new_with_invalid_markup_pattern() {
        let settings = create_settings(&["**/*.{html"], &["**/*.js"], &[]);

        let result = FileMatcher::new(PathBuf::from("/workspace"), &settings);

        assert!(matches!(result, Err(MatcherError::InvalidMarkupPattern { .. })));
    }

    #[rstest]
    fn new_with_invalid_script_pattern() {
        let settings = create_settings(&["**/*.html"], &["**/*.{js"], &[]);

        let result = FileMatcher::new(PathBuf::from("/workspace"), &settings);

        assert!(matches!(result, Err(MatcherError::InvalidScriptPattern { .. })));
    }

    #[rstest]
    fn new_with_invalid_exclude_pattern() {
        let settings = create_settings(&["**/*.html"], &["**/*.js"], &["[invalid"]);

        let result = FileMatcher::new(PathBuf::from("/workspace"), &settings);

        assert!(matches!(result, Err(MatcherError::InvalidExcludePattern { .. })));
    }
}
