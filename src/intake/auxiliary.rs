use super::error::FlowError;
use super::texts::{
    support_relay, GAME_ANSWER, GAME_HIT, GAME_MISS, GAME_PROMPT, SUPPORT_PROMPT, SUPPORT_SENT,
};
use super::IntakeEngine;
use crate::session::{Session, Step};
use crate::shared::{now_secs, ChatTarget, UserId};

impl IntakeEngine {
    pub(crate) fn start_game(&self, user: UserId) -> Result<(), FlowError> {
        self.send(&ChatTarget::from(user), GAME_PROMPT, None)?;
        self.sessions
            .put(user, Session::begin(Step::AwaitingGameGuess, now_secs()));
        Ok(())
    }

    /// One guess per game; the session ends whatever the answer.
    pub(crate) fn check_guess(
        &self,
        user: UserId,
        text: &str,
        _session: Session,
    ) -> Result<(), FlowError> {
        self.sessions.remove(user);
        let reply = if text.trim() == GAME_ANSWER {
            GAME_HIT
        } else {
            GAME_MISS
        };
        self.send(&ChatTarget::from(user), reply, None)
    }

    pub(crate) fn start_support(&self, user: UserId) -> Result<(), FlowError> {
        self.send(&ChatTarget::from(user), SUPPORT_PROMPT, None)?;
        self.sessions
            .put(user, Session::begin(Step::AwaitingSupportMessage, now_secs()));
        Ok(())
    }

    pub(crate) fn relay_support_message(
        &self,
        user: UserId,
        text: &str,
        _session: Session,
    ) -> Result<(), FlowError> {
        self.sessions.remove(user);
        let admin = ChatTarget::from(self.settings.admin_chat_id);
        self.send(&admin, &support_relay(user, text), None)?;
        self.log.info(
            "support.forwarded",
            &format!("support message from user {user} forwarded to {admin}"),
        );
        self.send(&ChatTarget::from(user), SUPPORT_SENT, None)
    }
}
