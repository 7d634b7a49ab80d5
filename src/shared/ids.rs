use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Chat identity of a bot user. Private chats share the user's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("user id must be non-empty".to_string());
        }
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| format!("user id `{trimmed}` must be a decimal integer"))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(raw) => Self::parse(&raw)
                .map_err(|err| D::Error::custom(format!("invalid user id `{raw}`: {err}"))),
        }
    }
}

/// Outbound destination: a numeric chat id or a public `@handle`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChatTarget(String);

impl ChatTarget {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if let Some(handle) = trimmed.strip_prefix('@') {
            if handle.is_empty()
                || !handle
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            {
                return Err(format!(
                    "chat handle `{trimmed}` must use only ASCII letters, digits or '_'"
                ));
            }
            return Ok(Self(trimmed.to_string()));
        }
        UserId::parse(trimmed).map(Self::from)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<UserId> for ChatTarget {
    fn from(value: UserId) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for ChatTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self::from(UserId::new(value))),
            Raw::Text(raw) => Self::parse(&raw)
                .map_err(|err| D::Error::custom(format!("invalid chat target `{raw}`: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatTarget, UserId};

    #[test]
    fn user_id_parses_signed_decimal() {
        assert_eq!(UserId::parse(" 42 ").expect("parse").get(), 42);
        assert_eq!(UserId::parse("-1001").expect("parse").get(), -1001);
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("abc").is_err());
    }

    #[test]
    fn chat_target_accepts_handles_and_ids() {
        assert_eq!(
            ChatTarget::parse("@dars_channel").expect("handle").as_str(),
            "@dars_channel"
        );
        assert_eq!(ChatTarget::parse("-100200").expect("id").as_str(), "-100200");
        assert!(ChatTarget::parse("@").is_err());
        assert!(ChatTarget::parse("@bad handle").is_err());
        assert!(ChatTarget::parse("channel").is_err());
    }

    #[test]
    fn yaml_accepts_numbers_and_strings() {
        let id: UserId = serde_yaml::from_str("12345").expect("number");
        assert_eq!(id, UserId::new(12345));
        let id: UserId = serde_yaml::from_str("\"777\"").expect("string");
        assert_eq!(id, UserId::new(777));
        let target: ChatTarget = serde_yaml::from_str("\"@news\"").expect("handle");
        assert_eq!(target.as_str(), "@news");
        let target: ChatTarget = serde_yaml::from_str("-100").expect("number");
        assert_eq!(target.as_str(), "-100");
    }
}
