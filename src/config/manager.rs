//! Settings management.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    LocalesSettings,
    loader,
};

/// Loads, validates and holds the settings of one invocation.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Settings of the last successful load, defaults before that.
    current_settings: LocalesSettings,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: LocalesSettings::default() }
    }

    /// Loads settings for a workspace.
    ///
    /// An explicit `config_file` must exist. Without one, `.locales.json` in
    /// the workspace root is used when present, defaults otherwise.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(
        &mut self,
        workspace_root: Option<PathBuf>,
        config_file: Option<&Path>,
    ) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let settings = if let Some(file) = config_file {
            loader::load_from_file(file)?
        } else if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(LocalesSettings::default, |ws| {
                tracing::debug!("Loaded workspace settings: {:?}", ws);
                ws
            })
        } else {
            LocalesSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &LocalesSettings {
        &self.current_settings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings().locales, vec!["en_US".to_string()]);
    }

    #[rstest]
    fn test_load_settings_without_workspace() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None, None);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().locale_name, "i18n");
    }

    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".locales.json"), r#"{"localeName": "l10n"}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()), None);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().locale_name, "l10n");
    }

    #[rstest]
    fn test_load_settings_with_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("custom.json");
        fs::write(&file, r#"{"locales": ["ja_JP"]}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()), Some(&file));

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().locales, vec!["ja_JP".to_string()]);
    }

    #[rstest]
    fn test_load_settings_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".locales.json"), r#"{"locales": []}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()), None);

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert_eq!(manager.get_settings().locales, vec!["en_US".to_string()]);
    }
}
