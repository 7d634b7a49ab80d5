//! Conversation engine: routes each inbound event through the per-user state
//! machine and talks back through a [`Channel`].
//!
//! Every event is handled to completion or reported as a failure at
//! [`IntakeEngine::handle_event`]; nothing propagates out of it.

use crate::channels::{Channel, InboundEvent, Markup};
use crate::config::{ApprovalMode, RuntimeConfig};
use crate::session::SessionStore;
use crate::shared::{ChatTarget, LogSink, UserId};
use std::sync::Arc;
use std::time::Duration;

pub mod approval;
pub mod auxiliary;
pub mod correlation;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod router;
pub mod texts;

pub use correlation::{CorrelationToken, DecisionAction};
pub use error::FlowError;
pub use router::{Command, Entry, MenuAction, Route};

use router::route_text;
use texts::{
    BOOKS_CHOSEN, FAQ_CHOSEN, GOODBYE, HELP_TEXT, MAIN_MENU_LABELS, MENU_PROMPT,
};

/// The subset of runtime configuration the conversation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub approval_mode: ApprovalMode,
    pub broadcast_chat: ChatTarget,
    pub admin_chat_id: UserId,
    pub channel_handle: String,
    pub session_idle_timeout: Option<Duration>,
}

impl FlowSettings {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            approval_mode: config.approval_mode,
            broadcast_chat: config.broadcast_chat.clone(),
            admin_chat_id: config.admin_chat_id,
            channel_handle: config.channel_handle.clone(),
            session_idle_timeout: config.session_idle_timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// Recognized as noise; no reply was sent and no state changed.
    Ignored,
    /// The handler failed; the user was sent a best-effort notice.
    Failed(String),
}

pub struct IntakeEngine {
    channel: Arc<dyn Channel>,
    sessions: Arc<dyn SessionStore>,
    settings: FlowSettings,
    log: LogSink,
}

impl IntakeEngine {
    pub fn new(
        channel: Arc<dyn Channel>,
        sessions: Arc<dyn SessionStore>,
        settings: FlowSettings,
        log: LogSink,
    ) -> Self {
        Self {
            channel,
            sessions,
            settings,
            log,
        }
    }

    pub fn handle_event(&self, event: &InboundEvent) -> EventOutcome {
        let result = match event {
            InboundEvent::Text { user, text } => self.handle_text(*user, text),
            InboundEvent::Decision { user, token } => self.decide(*user, token),
        };

        match result {
            Ok(EventOutcome::Ignored) => {
                self.log.info(
                    "event.ignored",
                    &format!("ignored {} from user {}", event_kind(event), event.user()),
                );
                EventOutcome::Ignored
            }
            Ok(outcome) => outcome,
            Err(err) => {
                let user = event.user();
                self.log.error(
                    "event.failed",
                    &format!(
                        "{} from user {user} failed ({}): {err}",
                        event_kind(event),
                        err.kind()
                    ),
                );
                self.notify(&ChatTarget::from(user), err.user_notice(), None);
                EventOutcome::Failed(err.to_string())
            }
        }
    }

    /// Drops sessions idle for longer than the configured timeout.
    pub fn evict_idle_sessions(&self, now: i64) -> Vec<UserId> {
        let Some(timeout) = self.settings.session_idle_timeout else {
            return Vec::new();
        };
        let cutoff = now.saturating_sub(timeout.as_secs() as i64);
        let evicted = self.sessions.evict_idle(cutoff);
        for user in &evicted {
            self.log.info(
                "session.evicted",
                &format!("session for user {user} evicted after {}s idle", timeout.as_secs()),
            );
        }
        evicted
    }

    pub fn show_main_menu(&self, user: UserId) -> Result<(), FlowError> {
        self.send(&ChatTarget::from(user), MENU_PROMPT, Some(&main_menu()))
    }

    fn handle_text(&self, user: UserId, text: &str) -> Result<EventOutcome, FlowError> {
        let session = self.sessions.get(user);
        match route_text(text, session.as_ref()) {
            Route::Entry(entry) => {
                self.sessions.remove(user);
                self.enter(user, entry)?;
                Ok(EventOutcome::Handled)
            }
            Route::Continue(step) => match (router::text_handler(step), session) {
                (Some(handler), Some(session)) => {
                    handler(self, user, text, session)?;
                    Ok(EventOutcome::Handled)
                }
                _ => Ok(EventOutcome::Ignored),
            },
            Route::Ignore => Ok(EventOutcome::Ignored),
        }
    }

    fn enter(&self, user: UserId, entry: Entry) -> Result<(), FlowError> {
        let to = ChatTarget::from(user);
        match entry {
            Entry::Command(Command::Start) => self.show_main_menu(user),
            Entry::Command(Command::Help) => self.send(&to, HELP_TEXT, None),
            Entry::Menu(MenuAction::Books) => self.send(&to, BOOKS_CHOSEN, None),
            Entry::Menu(MenuAction::Faq) => self.send(&to, FAQ_CHOSEN, None),
            Entry::Menu(MenuAction::Professors) => self.start_form(user),
            Entry::Menu(MenuAction::Game) => self.start_game(user),
            Entry::Menu(MenuAction::Support) => self.start_support(user),
            Entry::Menu(MenuAction::Exit) => self.send(&to, GOODBYE, None),
        }
    }

    fn send(&self, to: &ChatTarget, text: &str, markup: Option<&Markup>) -> Result<(), FlowError> {
        self.channel.send_text(to, text, markup)?;
        Ok(())
    }

    /// Best-effort send; failures are logged and swallowed.
    fn notify(&self, to: &ChatTarget, text: &str, markup: Option<&Markup>) {
        if let Err(err) = self.channel.send_text(to, text, markup) {
            self.log.warn(
                "event.notice_failed",
                &format!("notice to {to} was not delivered: {err}"),
            );
        }
    }
}

/// Key under which an event is serialized against other events. Decisions
/// serialize with the submitter whose session they resolve.
pub fn dispatch_key(event: &InboundEvent) -> UserId {
    match event {
        InboundEvent::Text { user, .. } => *user,
        InboundEvent::Decision { user, token } => CorrelationToken::parse(token)
            .map(|token| token.submitter)
            .unwrap_or(*user),
    }
}

pub(crate) fn main_menu() -> Markup {
    Markup::Menu(MAIN_MENU_LABELS.iter().map(|label| label.to_string()).collect())
}

fn event_kind(event: &InboundEvent) -> &'static str {
    match event {
        InboundEvent::Text { .. } => "text",
        InboundEvent::Decision { .. } => "decision",
    }
}
