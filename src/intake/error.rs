use super::texts::{NOTICE_GENERIC, NOTICE_SESSION_MISSING, NOTICE_TRANSPORT};
use crate::channels::ChannelError;
use crate::session::SessionError;
use crate::shared::UserId;

/// Failures a handler reports to the per-event boundary.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("outbound delivery failed: {0}")]
    Transport(#[from] ChannelError),
    #[error("no active session for user {user}")]
    SessionMissing { user: UserId },
    #[error("malformed correlation token `{token}`: {reason}")]
    MalformedToken { token: String, reason: String },
    #[error("user {presser} may not decide on token `{token}`")]
    UnauthorizedDecision { presser: UserId, token: String },
    #[error("session invariant violated: {0}")]
    Session(#[from] SessionError),
}

impl FlowError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::SessionMissing { .. } => "session_missing",
            Self::MalformedToken { .. } => "malformed_token",
            Self::UnauthorizedDecision { .. } => "unauthorized_decision",
            Self::Session(_) => "session_invariant",
        }
    }

    /// Text shown to the user whose event failed.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Transport(_) => NOTICE_TRANSPORT,
            Self::SessionMissing { .. }
            | Self::MalformedToken { .. }
            | Self::UnauthorizedDecision { .. } => NOTICE_SESSION_MISSING,
            Self::Session(_) => NOTICE_GENERIC,
        }
    }
}
