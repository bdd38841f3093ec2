//! Configuration file loading.

use std::path::Path;

use super::{
    ConfigError,
    LocalesSettings,
};

/// File name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".locales.json";

/// Loads settings from the workspace root.
///
/// Looks for a `.locales.json` file.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and was parsed
/// - `Ok(None)`: no configuration file
/// - `Err(ConfigError)`: read or parse error
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<LocalesSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

/// Loads settings from an explicit file. A missing file is an error here.
pub(super) fn load_from_file(config_path: &Path) -> Result<LocalesSettings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)?;
    let settings: LocalesSettings = serde_json::from_str(&content)?;

    Ok(settings)
}
