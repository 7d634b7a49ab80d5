//! Per-user conversational state.

use serde::Serialize;
use std::collections::BTreeMap;

pub mod store;

pub use store::{InMemorySessionStore, SessionStore};

/// The prompt a session is waiting to have answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Idle,
    AwaitingCourse,
    AwaitingInstructor,
    AwaitingQuestion,
    AwaitingConfirmation,
    AwaitingGameGuess,
    AwaitingSupportMessage,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingCourse => "awaiting_course",
            Self::AwaitingInstructor => "awaiting_instructor",
            Self::AwaitingQuestion => "awaiting_question",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::AwaitingGameGuess => "awaiting_game_guess",
            Self::AwaitingSupportMessage => "awaiting_support_message",
        }
    }

    /// Field answered while in this step, for the form steps only.
    pub fn form_field(self) -> Option<Field> {
        match self {
            Self::AwaitingCourse => Some(Field::Course),
            Self::AwaitingInstructor => Some(Field::Instructor),
            Self::AwaitingQuestion => Some(Field::Question),
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Course,
    Instructor,
    Question,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Instructor => "instructor",
            Self::Question => "question",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three captured answers, taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub course: String,
    pub instructor: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("field `{0}` was already captured")]
    FieldAlreadyCaptured(Field),
    #[error("submission is already rendered; field `{0}` can no longer change")]
    SubmissionLocked(Field),
    #[error("submission is incomplete; `{0}` has not been captured")]
    Incomplete(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    step: Step,
    fields: BTreeMap<Field, String>,
    rendered: Option<String>,
    touched_at: i64,
}

impl Session {
    /// A fresh session with no captured fields.
    pub fn begin(step: Step, now: i64) -> Self {
        Self {
            step,
            fields: BTreeMap::new(),
            rendered: None,
            touched_at: now,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn touched_at(&self) -> i64 {
        self.touched_at
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn captured_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn advance(&mut self, step: Step, now: i64) {
        self.step = step;
        self.touched_at = now;
    }

    pub fn capture(&mut self, field: Field, value: &str) -> Result<(), SessionError> {
        if self.rendered.is_some() {
            return Err(SessionError::SubmissionLocked(field));
        }
        if self.fields.contains_key(&field) {
            return Err(SessionError::FieldAlreadyCaptured(field));
        }
        self.fields.insert(field, value.to_string());
        Ok(())
    }

    pub fn submission(&self) -> Result<Submission, SessionError> {
        let take = |field: Field| {
            self.field(field)
                .map(str::to_string)
                .ok_or(SessionError::Incomplete(field))
        };
        Ok(Submission {
            course: take(Field::Course)?,
            instructor: take(Field::Instructor)?,
            question: take(Field::Question)?,
        })
    }

    /// Renders the submission the first time it is called and returns the
    /// cached text afterwards; `render` never runs twice.
    pub fn render_with<F>(&mut self, render: F) -> Result<&str, SessionError>
    where
        F: FnOnce(&Submission) -> String,
    {
        if self.rendered.is_none() {
            let submission = self.submission()?;
            self.rendered = Some(render(&submission));
        }
        Ok(self.rendered.as_deref().unwrap_or_default())
    }
}
