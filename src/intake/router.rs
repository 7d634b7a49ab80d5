use super::error::FlowError;
use super::texts::{
    LABEL_BOOKS, LABEL_EXIT, LABEL_FAQ, LABEL_GAME, LABEL_PROFESSORS, LABEL_SUPPORT,
};
use super::IntakeEngine;
use crate::session::{Session, Step};
use crate::shared::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Books,
    Professors,
    Faq,
    Game,
    Support,
    Exit,
}

/// Top-level entries pre-empt whatever step the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Command(Command),
    Menu(MenuAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Entry(Entry),
    /// Free text answering the session's current step.
    Continue(Step),
    Ignore,
}

/// Handler for free text arriving while a session sits at a given step.
pub(crate) type TextHandler = fn(&IntakeEngine, UserId, &str, Session) -> Result<(), FlowError>;

/// Recognizes `/command` (optionally `/command@botname`) and menu labels.
pub fn classify_entry(text: &str) -> Option<Entry> {
    let trimmed = text.trim();
    if let Some(command) = trimmed.strip_prefix('/') {
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        return match name.as_str() {
            "start" => Some(Entry::Command(Command::Start)),
            "help" => Some(Entry::Command(Command::Help)),
            "courses" => Some(Entry::Menu(MenuAction::Books)),
            "professors" => Some(Entry::Menu(MenuAction::Professors)),
            "game" => Some(Entry::Menu(MenuAction::Game)),
            "support" => Some(Entry::Menu(MenuAction::Support)),
            "exit" => Some(Entry::Menu(MenuAction::Exit)),
            _ => None,
        };
    }

    let action = match trimmed {
        LABEL_BOOKS => MenuAction::Books,
        LABEL_PROFESSORS => MenuAction::Professors,
        LABEL_FAQ => MenuAction::Faq,
        LABEL_GAME => MenuAction::Game,
        LABEL_SUPPORT => MenuAction::Support,
        LABEL_EXIT => MenuAction::Exit,
        _ => return None,
    };
    Some(Entry::Menu(action))
}

pub fn route_text(text: &str, session: Option<&Session>) -> Route {
    if let Some(entry) = classify_entry(text) {
        return Route::Entry(entry);
    }
    match session.map(Session::step) {
        Some(Step::Idle) | None => Route::Ignore,
        Some(step) => Route::Continue(step),
    }
}

/// Dispatch table from step to free-text handler. Steps without a handler
/// (idle, or waiting on a button press) ignore free text.
pub(crate) fn text_handler(step: Step) -> Option<TextHandler> {
    match step {
        Step::AwaitingCourse | Step::AwaitingInstructor | Step::AwaitingQuestion => {
            Some(IntakeEngine::capture_form_answer)
        }
        Step::AwaitingGameGuess => Some(IntakeEngine::check_guess),
        Step::AwaitingSupportMessage => Some(IntakeEngine::relay_support_message),
        Step::Idle | Step::AwaitingConfirmation => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_accept_bot_suffix_and_arguments() {
        assert_eq!(
            classify_entry("/start"),
            Some(Entry::Command(Command::Start))
        );
        assert_eq!(
            classify_entry(" /Help@intake_bot please "),
            Some(Entry::Command(Command::Help))
        );
        assert_eq!(
            classify_entry("/courses"),
            Some(Entry::Menu(MenuAction::Books))
        );
        assert_eq!(classify_entry("/unknown"), None);
        assert_eq!(classify_entry("/"), None);
    }

    #[test]
    fn menu_labels_match_after_trimming() {
        assert_eq!(
            classify_entry(&format!("  {LABEL_PROFESSORS}  ")),
            Some(Entry::Menu(MenuAction::Professors))
        );
        assert_eq!(
            classify_entry(LABEL_EXIT),
            Some(Entry::Menu(MenuAction::Exit))
        );
        assert_eq!(classify_entry("professors"), None);
    }

    #[test]
    fn free_text_follows_the_session_step() {
        let session = Session::begin(Step::AwaitingInstructor, 0);
        assert_eq!(
            route_text("Dr. A", Some(&session)),
            Route::Continue(Step::AwaitingInstructor)
        );
        assert_eq!(route_text("Dr. A", None), Route::Ignore);
    }

    #[test]
    fn entries_pre_empt_an_active_step() {
        let session = Session::begin(Step::AwaitingQuestion, 0);
        assert_eq!(
            route_text(LABEL_GAME, Some(&session)),
            Route::Entry(Entry::Menu(MenuAction::Game))
        );
    }

    #[test]
    fn dispatch_table_covers_only_text_driven_steps() {
        for step in [
            Step::AwaitingCourse,
            Step::AwaitingInstructor,
            Step::AwaitingQuestion,
            Step::AwaitingGameGuess,
            Step::AwaitingSupportMessage,
        ] {
            assert!(text_handler(step).is_some(), "{step} has no handler");
        }
        assert!(text_handler(Step::Idle).is_none());
        assert!(text_handler(Step::AwaitingConfirmation).is_none());
    }
}
