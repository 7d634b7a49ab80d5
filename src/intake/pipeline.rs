use super::error::FlowError;
use super::texts::{PROFESSORS_CHOSEN, PROMPT_COURSE, PROMPT_INSTRUCTOR, PROMPT_QUESTION};
use super::IntakeEngine;
use crate::session::{Field, Session, Step};
use crate::shared::{now_secs, ChatTarget, UserId};

impl IntakeEngine {
    pub(crate) fn start_form(&self, user: UserId) -> Result<(), FlowError> {
        let to = ChatTarget::from(user);
        self.send(&to, PROFESSORS_CHOSEN, None)?;
        self.send(&to, PROMPT_COURSE, None)?;
        self.sessions
            .put(user, Session::begin(Step::AwaitingCourse, now_secs()));
        Ok(())
    }

    /// Stores the answer for the current form step and moves on. The session
    /// is committed only once the next prompt has gone out.
    pub(crate) fn capture_form_answer(
        &self,
        user: UserId,
        text: &str,
        mut session: Session,
    ) -> Result<(), FlowError> {
        let field = session
            .step()
            .form_field()
            .ok_or(FlowError::SessionMissing { user })?;
        session.capture(field, text)?;

        match field {
            Field::Course => {
                self.prompt_next(user, session, Step::AwaitingInstructor, PROMPT_INSTRUCTOR)
            }
            Field::Instructor => {
                self.prompt_next(user, session, Step::AwaitingQuestion, PROMPT_QUESTION)
            }
            Field::Question => self.request_approval(user, session),
        }
    }

    fn prompt_next(
        &self,
        user: UserId,
        mut session: Session,
        next: Step,
        prompt: &str,
    ) -> Result<(), FlowError> {
        self.send(&ChatTarget::from(user), prompt, None)?;
        session.advance(next, now_secs());
        self.sessions.put(user, session);
        Ok(())
    }
}
