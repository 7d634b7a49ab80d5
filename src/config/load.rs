use super::{default_global_config_path, ConfigError, RuntimeConfig, Settings};
use std::path::Path;

/// Resolves the runtime configuration from `.env`, the settings file and the
/// process environment, in that order of increasing precedence.
pub fn load_runtime_config(explicit_path: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    let mut settings = load_settings(explicit_path)?;
    settings.apply_env_overrides()?;
    settings.into_runtime()
}

pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit_path {
        return Settings::from_path(path);
    }
    let path = match default_global_config_path() {
        Ok(path) => path,
        Err(ConfigError::HomeDirectoryUnavailable) => return Ok(Settings::default()),
        Err(err) => return Err(err),
    };
    if path.exists() {
        Settings::from_path(&path)
    } else {
        Ok(Settings::default())
    }
}
