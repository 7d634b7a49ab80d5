//! Transport boundary. The intake core only talks to a [`Channel`]; concrete
//! adapters live in the submodules.

use crate::shared::{ChatTarget, UserId};

pub mod local;
pub mod telegram;

pub use local::{LocalChannel, SentMessage};
pub use telegram::TelegramChannel;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("transport request failed: {0}")]
    Request(String),
    #[error("channel api returned an error (status {status}): {description}")]
    Api { status: u16, description: String },
    #[error("failed to decode channel response: {0}")]
    Decode(String),
    #[error("channel is closed")]
    Closed,
}

/// One inbound interaction from a remote user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Free text, a command or a menu label typed by `user`.
    Text { user: UserId, text: String },
    /// An interactive button press carrying a correlation token.
    Decision { user: UserId, token: String },
}

impl InboundEvent {
    pub fn user(&self) -> UserId {
        match self {
            Self::Text { user, .. } | Self::Decision { user, .. } => *user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionButton {
    pub label: String,
    pub token: String,
}

/// Interactive options attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Persistent reply keyboard; pressing a button sends its label as text.
    Menu(Vec<String>),
    /// Inline buttons; pressing one produces an [`InboundEvent::Decision`].
    Decision(Vec<DecisionButton>),
}

pub trait Channel: Send + Sync {
    /// Returns the next batch of inbound events. The adapter owns the cursor,
    /// so consecutive calls walk an unbounded stream; an empty batch is normal.
    fn poll(&self) -> Result<Vec<InboundEvent>, ChannelError>;

    fn send_text(
        &self,
        to: &ChatTarget,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), ChannelError>;
}
