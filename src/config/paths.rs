use crate::config::ConfigError;
use std::path::PathBuf;

pub const GLOBAL_STATE_DIR: &str = ".intakebot";
pub const GLOBAL_SETTINGS_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_LOG_FILE: &str = "logs/bot.log";

fn state_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(GLOBAL_STATE_DIR))
}

pub fn default_global_config_path() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join(GLOBAL_SETTINGS_FILE_NAME))
}

pub fn default_log_path() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join(DEFAULT_LOG_FILE))
}
