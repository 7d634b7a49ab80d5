#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("missing required setting `{key}` (set it in the config file or via `{env}`)")]
    MissingRequired { key: &'static str, env: &'static str },
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to resolve home directory for default config path")]
    HomeDirectoryUnavailable,
}
