use crate::shared::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionAction {
    Confirm,
    Cancel,
    Reject,
}

impl DecisionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Reject => "reject",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "confirm" => Some(Self::Confirm),
            "cancel" => Some(Self::Cancel),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a decision button: `<action>_<submitter id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationToken {
    pub action: DecisionAction,
    pub submitter: UserId,
}

impl CorrelationToken {
    pub fn new(action: DecisionAction, submitter: UserId) -> Self {
        Self { action, submitter }
    }

    pub fn encode(&self) -> String {
        format!("{}_{}", self.action, self.submitter)
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let (action, id) = raw
            .split_once('_')
            .ok_or_else(|| "expected `<action>_<id>`".to_string())?;
        let action = DecisionAction::parse(action)
            .ok_or_else(|| format!("unknown action `{action}`"))?;
        let decimal = id
            .strip_prefix('-')
            .unwrap_or(id)
            .chars()
            .all(|ch| ch.is_ascii_digit());
        if id.is_empty() || !decimal {
            return Err(format!("id `{id}` is not a decimal identity"));
        }
        let submitter = UserId::parse(id)?;
        Ok(Self { action, submitter })
    }
}

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.action, self.submitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_encode_action_and_submitter() {
        let token = CorrelationToken::new(DecisionAction::Confirm, UserId::new(123456));
        assert_eq!(token.encode(), "confirm_123456");
        assert_eq!(
            CorrelationToken::parse("reject_42").expect("parse"),
            CorrelationToken::new(DecisionAction::Reject, UserId::new(42))
        );
        assert_eq!(
            CorrelationToken::parse("cancel_-100").expect("negative id"),
            CorrelationToken::new(DecisionAction::Cancel, UserId::new(-100))
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for raw in [
            "",
            "confirm",
            "confirm_",
            "approve_12",
            "confirm_12_3",
            "confirm_ 12",
            "confirm_abc",
            "CONFIRM_12",
            "confirm_1-2",
        ] {
            assert!(CorrelationToken::parse(raw).is_err(), "accepted `{raw}`");
        }
    }
}
