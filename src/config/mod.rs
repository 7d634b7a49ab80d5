pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_runtime_config, load_settings};
pub use paths::{
    default_global_config_path, default_log_path, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{
    ApprovalMode, RuntimeConfig, RuntimeSettings, Settings, TelegramSettings,
    DEFAULT_CHANNEL_HANDLE, DEFAULT_TELEGRAM_API_BASE,
};
