//! Preview, review and publication of a rendered submission.
//!
//! Decision buttons carry `<action>_<submitter>` tokens. Resolving a token
//! consumes the submitter's session before anything is published, so a second
//! press on the same buttons finds nothing to act on.

use super::correlation::{CorrelationToken, DecisionAction};
use super::error::FlowError;
use super::render::render_submission;
use super::texts::{
    AWAITING_REVIEW, BUTTON_CANCEL, BUTTON_CONFIRM, BUTTON_REJECT, DIRECT_CANCELLED,
    DIRECT_PUBLISHED, NOTICE_TRANSPORT, PREVIEW_HEADER, REVIEW_HEADER, REVIEW_PUBLISHED_ADMIN,
    REVIEW_PUBLISHED_SUBMITTER, REVIEW_REJECTED_ADMIN, REVIEW_REJECTED_SUBMITTER,
};
use super::{main_menu, EventOutcome, IntakeEngine};
use crate::channels::{DecisionButton, Markup};
use crate::config::ApprovalMode;
use crate::session::{Session, Step};
use crate::shared::{now_secs, ChatTarget, UserId};

impl IntakeEngine {
    pub(crate) fn request_approval(
        &self,
        user: UserId,
        mut session: Session,
    ) -> Result<(), FlowError> {
        let rendered = session
            .render_with(|submission| {
                render_submission(submission, &self.settings.channel_handle)
            })?
            .to_string();
        session.advance(Step::AwaitingConfirmation, now_secs());

        match self.settings.approval_mode {
            ApprovalMode::Direct => {
                let buttons = decision_buttons(
                    user,
                    &[
                        (BUTTON_CONFIRM, DecisionAction::Confirm),
                        (BUTTON_CANCEL, DecisionAction::Cancel),
                    ],
                );
                self.send(
                    &ChatTarget::from(user),
                    &format!("{PREVIEW_HEADER}\n\n{rendered}"),
                    Some(&buttons),
                )?;
                self.sessions.put(user, session);
            }
            ApprovalMode::Moderated => {
                let buttons = decision_buttons(
                    user,
                    &[
                        (BUTTON_CONFIRM, DecisionAction::Confirm),
                        (BUTTON_REJECT, DecisionAction::Reject),
                    ],
                );
                self.send(
                    &ChatTarget::from(self.settings.admin_chat_id),
                    &format!("{REVIEW_HEADER}\n\n{rendered}"),
                    Some(&buttons),
                )?;
                self.sessions.put(user, session);
                self.notify(&ChatTarget::from(user), AWAITING_REVIEW, None);
            }
        }

        self.log.info(
            "submission.requested",
            &format!(
                "submission from user {user} awaiting {} decision",
                self.settings.approval_mode
            ),
        );
        Ok(())
    }

    pub(crate) fn decide(&self, presser: UserId, raw: &str) -> Result<EventOutcome, FlowError> {
        let token = self.parse_decision(presser, raw)?;
        self.authorize(presser, &token, raw)?;

        let submitter = token.submitter;
        let rendered = self
            .sessions
            .get(submitter)
            .filter(|session| session.step() == Step::AwaitingConfirmation)
            .and_then(|session| session.rendered().map(str::to_string))
            .ok_or(FlowError::SessionMissing { user: submitter })?;
        self.sessions
            .remove(submitter)
            .ok_or(FlowError::SessionMissing { user: submitter })?;

        match token.action {
            DecisionAction::Confirm => self.publish(submitter, &rendered)?,
            DecisionAction::Cancel => {
                self.notify(
                    &ChatTarget::from(submitter),
                    DIRECT_CANCELLED,
                    Some(&main_menu()),
                );
                self.log.info(
                    "submission.cancelled",
                    &format!("user {submitter} cancelled their submission"),
                );
            }
            DecisionAction::Reject => {
                self.notify(&ChatTarget::from(submitter), REVIEW_REJECTED_SUBMITTER, None);
                self.notify(&ChatTarget::from(presser), REVIEW_REJECTED_ADMIN, None);
                self.log.info(
                    "submission.rejected",
                    &format!("submission from user {submitter} rejected by {presser}"),
                );
            }
        }
        Ok(EventOutcome::Handled)
    }

    fn parse_decision(&self, presser: UserId, raw: &str) -> Result<CorrelationToken, FlowError> {
        let mode = self.settings.approval_mode;
        if mode == ApprovalMode::Direct {
            // Bare tokens from older preview messages resolve to the presser.
            if let Some(action @ (DecisionAction::Confirm | DecisionAction::Cancel)) =
                DecisionAction::parse(raw)
            {
                return Ok(CorrelationToken::new(action, presser));
            }
        }

        let token = CorrelationToken::parse(raw).map_err(|reason| FlowError::MalformedToken {
            token: raw.to_string(),
            reason,
        })?;
        let allowed = match mode {
            ApprovalMode::Direct => {
                matches!(token.action, DecisionAction::Confirm | DecisionAction::Cancel)
            }
            ApprovalMode::Moderated => {
                matches!(token.action, DecisionAction::Confirm | DecisionAction::Reject)
            }
        };
        if !allowed {
            return Err(FlowError::MalformedToken {
                token: raw.to_string(),
                reason: format!("`{}` is not a decision in {mode} mode", token.action),
            });
        }
        Ok(token)
    }

    fn authorize(
        &self,
        presser: UserId,
        token: &CorrelationToken,
        raw: &str,
    ) -> Result<(), FlowError> {
        let decider = match self.settings.approval_mode {
            ApprovalMode::Direct => token.submitter,
            ApprovalMode::Moderated => self.settings.admin_chat_id,
        };
        if presser != decider {
            return Err(FlowError::UnauthorizedDecision {
                presser,
                token: raw.to_string(),
            });
        }
        Ok(())
    }

    fn publish(&self, submitter: UserId, rendered: &str) -> Result<(), FlowError> {
        if let Err(err) = self.send(&self.settings.broadcast_chat, rendered, None) {
            // The boundary notice goes to the admin; the submitter hears it here.
            if self.settings.approval_mode == ApprovalMode::Moderated {
                self.notify(&ChatTarget::from(submitter), NOTICE_TRANSPORT, None);
            }
            return Err(err);
        }
        self.log.info(
            "submission.published",
            &format!(
                "submission from user {submitter} published to {}",
                self.settings.broadcast_chat
            ),
        );

        let to = ChatTarget::from(submitter);
        match self.settings.approval_mode {
            ApprovalMode::Direct => self.notify(&to, DIRECT_PUBLISHED, Some(&main_menu())),
            ApprovalMode::Moderated => {
                self.notify(&to, REVIEW_PUBLISHED_SUBMITTER, None);
                self.notify(
                    &ChatTarget::from(self.settings.admin_chat_id),
                    REVIEW_PUBLISHED_ADMIN,
                    None,
                );
            }
        }
        Ok(())
    }
}

fn decision_buttons(submitter: UserId, options: &[(&str, DecisionAction)]) -> Markup {
    Markup::Decision(
        options
            .iter()
            .map(|(label, action)| DecisionButton {
                label: label.to_string(),
                token: CorrelationToken::new(*action, submitter).encode(),
            })
            .collect(),
    )
}
