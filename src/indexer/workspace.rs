//! Glob expansion over the workspace tree.
use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use crate::indexer::types::DiscoveryError;

/// Expands `include_patterns` below `workspace_path`, skipping anything
/// matched by `exclude_patterns`.
///
/// Patterns are matched against paths relative to the workspace. The result
/// is sorted so that every run visits files in the same order.
///
/// # Errors
/// Returns `DiscoveryError` when a pattern is not a valid glob.
pub fn find_files(
    workspace_path: &Path,
    include_patterns: &[String],
    exclude_patterns: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if include_patterns.is_empty() {
        return Ok(Vec::new());
    }
    let include_set = build_set(include_patterns)?;
    let exclude_set = build_set(exclude_patterns)?;

    let mut found_files = Vec::new();
    for result in WalkBuilder::new(workspace_path)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(workspace_path) else {
            continue;
        };
        if !include_set.is_match(relative_path) || exclude_set.is_match(relative_path) {
            continue;
        }

        found_files.push(path.to_path_buf());
    }

    found_files.sort();
    tracing::debug!(
        workspace_path = %workspace_path.display(),
        count = found_files.len(),
        "Expanded source patterns"
    );
    Ok(found_files)
}

/// Path as recorded in stores and logs: relative to the workspace when
/// possible, with `/` separators on every platform.
#[must_use]
pub fn display_path(workspace_path: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(workspace_path).unwrap_or(path);
    let text = relative.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Compiles a list of globs into one set.
fn build_set(patterns: &[String]) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[fixture]
    fn workspace() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("app/views")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("app/main.js"), "").unwrap();
        fs::write(root.join("app/views/index.html"), "").unwrap();
        fs::write(root.join("app/style.css"), "").unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "").unwrap();
        temp_dir
    }

    #[rstest]
    fn find_files_matches_and_sorts(workspace: TempDir) {
        let root = workspace.path();

        let files =
            find_files(root, &patterns(&["**/*.js", "**/*.html"]), &patterns(&["node_modules/**"]))
                .unwrap();

        let labels: Vec<String> = files.iter().map(|path| display_path(root, path)).collect();
        assert_that!(labels, elements_are![eq("app/main.js"), eq("app/views/index.html")]);
    }

    #[rstest]
    fn find_files_without_exclude_includes_everything(workspace: TempDir) {
        let root = workspace.path();

        let files = find_files(root, &patterns(&["**/*.js"]), &[]).unwrap();

        assert_that!(files.len(), eq(2));
    }

    #[rstest]
    fn find_files_with_no_patterns_is_empty(workspace: TempDir) {
        let files = find_files(workspace.path(), &[], &[]).unwrap();

        assert!(files.is_empty());
    }

    #[rstest]
    fn find_files_rejects_invalid_glob(workspace: TempDir) {
        let result = find_files(workspace.path(), &patterns(&["**/*.{js"]), &[]);

        assert!(matches!(result, Err(DiscoveryError::InvalidPattern { .. })));
    }

    #[rstest]
    #[case::inside("/workspace/app/main.js", "app/main.js")]
    #[case::outside("/other/main.js", "/other/main.js")]
    fn test_display_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(display_path(Path::new("/workspace"), Path::new(path)), expected);
    }
}
