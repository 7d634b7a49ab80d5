use super::{default_log_path, ConfigError};
use crate::shared::{ChatTarget, UserId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_CHANNEL_HANDLE: &str = "@dars_ba_ki_br_darm";

pub const ENV_BOT_TOKEN: [&str; 2] = ["INTAKEBOT_BOT_TOKEN", "TOKEN"];
pub const ENV_BROADCAST_CHAT: [&str; 2] = ["INTAKEBOT_BROADCAST_CHAT", "CHANNEL_ID"];
pub const ENV_ADMIN_CHAT_ID: [&str; 2] = ["INTAKEBOT_ADMIN_CHAT_ID", "ADMIN_CHAT_ID"];

/// Who sees the confirm buttons for a finished submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// The submitter confirms or cancels their own submission.
    #[default]
    Direct,
    /// The admin approves or rejects on the submitter's behalf.
    Moderated,
}

impl ApprovalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Moderated => "moderated",
        }
    }
}

impl std::fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub telegram: TelegramSettings,
    pub broadcast_chat: Option<ChatTarget>,
    pub admin_chat_id: Option<UserId>,
    #[serde(default)]
    pub approval_mode: ApprovalMode,
    #[serde(default = "default_channel_handle")]
    pub channel_handle: String,
    #[serde(default = "default_session_idle_timeout_seconds")]
    pub session_idle_timeout_seconds: u64,
    #[serde(default)]
    pub runtime: RuntimeSettings,
    pub log_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub log_to_stderr: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram: TelegramSettings::default(),
            broadcast_chat: None,
            admin_chat_id: None,
            approval_mode: ApprovalMode::default(),
            channel_handle: default_channel_handle(),
            session_idle_timeout_seconds: default_session_idle_timeout_seconds(),
            runtime: RuntimeSettings::default(),
            log_path: None,
            log_to_stderr: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,
    #[serde(default = "default_send_timeout_milliseconds")]
    pub send_timeout_milliseconds: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_api_base(),
            poll_timeout_seconds: default_poll_timeout_seconds(),
            send_timeout_milliseconds: default_send_timeout_milliseconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeSettings {
    #[serde(default = "default_poll_backoff_seconds")]
    pub poll_backoff_seconds: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            poll_backoff_seconds: default_poll_backoff_seconds(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    DEFAULT_TELEGRAM_API_BASE.to_string()
}

fn default_channel_handle() -> String {
    DEFAULT_CHANNEL_HANDLE.to_string()
}

fn default_poll_timeout_seconds() -> u64 {
    25
}

fn default_send_timeout_milliseconds() -> u64 {
    10_000
}

fn default_session_idle_timeout_seconds() -> u64 {
    3600
}

fn default_poll_backoff_seconds() -> u64 {
    5
}

fn default_max_concurrency() -> usize {
    4
}

/// Validated settings; every required value is present.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bot_token: String,
    pub api_base: String,
    pub poll_timeout: Duration,
    pub send_timeout: Duration,
    pub broadcast_chat: ChatTarget,
    pub admin_chat_id: UserId,
    pub approval_mode: ApprovalMode,
    pub channel_handle: String,
    pub session_idle_timeout: Option<Duration>,
    pub poll_backoff: Duration,
    pub max_concurrency: usize,
    pub log_path: Option<PathBuf>,
    pub log_to_stderr: bool,
}

fn first_non_empty<F>(keys: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overlays credential and identity values found through `lookup`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = first_non_empty(&ENV_BOT_TOKEN, &lookup) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(raw) = first_non_empty(&ENV_BROADCAST_CHAT, &lookup) {
            let target = ChatTarget::parse(&raw).map_err(|reason| ConfigError::Invalid {
                key: "broadcast_chat",
                reason,
            })?;
            self.broadcast_chat = Some(target);
        }
        if let Some(raw) = first_non_empty(&ENV_ADMIN_CHAT_ID, &lookup) {
            let admin = UserId::parse(&raw).map_err(|reason| ConfigError::Invalid {
                key: "admin_chat_id",
                reason,
            })?;
            self.admin_chat_id = Some(admin);
        }
        Ok(())
    }

    pub fn into_runtime(self) -> Result<RuntimeConfig, ConfigError> {
        let bot_token = self
            .telegram
            .bot_token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingRequired {
                key: "telegram.bot_token",
                env: ENV_BOT_TOKEN[0],
            })?;
        let broadcast_chat = self.broadcast_chat.ok_or(ConfigError::MissingRequired {
            key: "broadcast_chat",
            env: ENV_BROADCAST_CHAT[0],
        })?;
        let admin_chat_id = self.admin_chat_id.ok_or(ConfigError::MissingRequired {
            key: "admin_chat_id",
            env: ENV_ADMIN_CHAT_ID[0],
        })?;

        if self.telegram.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "telegram.api_base",
                reason: "must be non-empty".to_string(),
            });
        }
        if self.channel_handle.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "channel_handle",
                reason: "must be non-empty".to_string(),
            });
        }
        if self.telegram.send_timeout_milliseconds == 0 {
            return Err(ConfigError::Invalid {
                key: "telegram.send_timeout_milliseconds",
                reason: "must be greater than zero".to_string(),
            });
        }

        let session_idle_timeout = match self.session_idle_timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        };
        let log_path = self.log_path.or_else(|| default_log_path().ok());

        Ok(RuntimeConfig {
            bot_token,
            api_base: self.telegram.api_base,
            poll_timeout: Duration::from_secs(self.telegram.poll_timeout_seconds),
            send_timeout: Duration::from_millis(self.telegram.send_timeout_milliseconds),
            broadcast_chat,
            admin_chat_id,
            approval_mode: self.approval_mode,
            channel_handle: self.channel_handle.trim().to_string(),
            session_idle_timeout,
            poll_backoff: Duration::from_secs(self.runtime.poll_backoff_seconds),
            max_concurrency: self.runtime.max_concurrency.max(1),
            log_path,
            log_to_stderr: self.log_to_stderr,
        })
    }
}
