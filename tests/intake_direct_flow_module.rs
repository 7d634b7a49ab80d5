use intakebot::channels::{InboundEvent, LocalChannel, Markup};
use intakebot::config::ApprovalMode;
use intakebot::intake::render::render_submission;
use intakebot::intake::texts::{
    DIRECT_CANCELLED, DIRECT_PUBLISHED, LABEL_PROFESSORS, NOTICE_SESSION_MISSING,
    NOTICE_TRANSPORT, PREVIEW_HEADER, PROFESSORS_CHOSEN, PROMPT_COURSE, PROMPT_INSTRUCTOR,
    PROMPT_QUESTION,
};
use intakebot::intake::{EventOutcome, FlowSettings, IntakeEngine};
use intakebot::session::{Field, InMemorySessionStore, SessionStore, Step, Submission};
use intakebot::shared::{ChatTarget, LogSink, UserId};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const SUBMITTER: i64 = 100;
const HANDLE: &str = "@dars_test";

struct Harness {
    channel: Arc<LocalChannel>,
    sessions: Arc<InMemorySessionStore>,
    engine: IntakeEngine,
}

fn broadcast() -> ChatTarget {
    ChatTarget::parse("@test_channel").expect("broadcast target")
}

fn harness_with_log(log: LogSink) -> Harness {
    let channel = Arc::new(LocalChannel::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let settings = FlowSettings {
        approval_mode: ApprovalMode::Direct,
        broadcast_chat: broadcast(),
        admin_chat_id: UserId::new(900),
        channel_handle: HANDLE.to_string(),
        session_idle_timeout: Some(Duration::from_secs(3600)),
    };
    let engine = IntakeEngine::new(channel.clone(), sessions.clone(), settings, log);
    Harness {
        channel,
        sessions,
        engine,
    }
}

fn harness() -> Harness {
    harness_with_log(LogSink::disabled())
}

fn text(user: i64, text: &str) -> InboundEvent {
    InboundEvent::Text {
        user: UserId::new(user),
        text: text.to_string(),
    }
}

fn press(user: i64, token: &str) -> InboundEvent {
    InboundEvent::Decision {
        user: UserId::new(user),
        token: token.to_string(),
    }
}

fn fill_form(h: &Harness, user: i64) {
    for input in [
        LABEL_PROFESSORS,
        "Linear Algebra",
        "Dr. A/Dr. B",
        "Is the final open book?",
    ] {
        assert_eq!(h.engine.handle_event(&text(user, input)), EventOutcome::Handled);
    }
}

fn expected_render() -> String {
    render_submission(
        &Submission {
            course: "Linear Algebra".to_string(),
            instructor: "Dr. A/Dr. B".to_string(),
            question: "Is the final open book?".to_string(),
        },
        HANDLE,
    )
}

#[test]
fn form_walks_through_each_prompt_and_previews_to_the_submitter() {
    let h = harness();
    fill_form(&h, SUBMITTER);

    let texts: Vec<String> = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts.len(), 5);
    assert_eq!(texts[0], PROFESSORS_CHOSEN);
    assert_eq!(texts[1], PROMPT_COURSE);
    assert_eq!(texts[2], PROMPT_INSTRUCTOR);
    assert_eq!(texts[3], PROMPT_QUESTION);
    assert_eq!(texts[4], format!("{PREVIEW_HEADER}\n\n{}", expected_render()));

    let preview = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .pop()
        .expect("preview");
    match preview.markup {
        Some(Markup::Decision(buttons)) => {
            let tokens: Vec<String> = buttons.into_iter().map(|b| b.token).collect();
            assert_eq!(tokens, vec!["confirm_100", "cancel_100"]);
        }
        other => panic!("expected decision buttons, got {other:?}"),
    }

    let session = h.sessions.get(UserId::new(SUBMITTER)).expect("session");
    assert_eq!(session.step(), Step::AwaitingConfirmation);
    assert_eq!(session.field(Field::Instructor), Some("Dr. A/Dr. B"));
    assert_eq!(session.rendered(), Some(expected_render().as_str()));
    assert!(h.channel.sent_to(broadcast()).is_empty());
}

#[test]
fn confirm_publishes_the_rendered_text_once() {
    let dir = tempdir().expect("temp dir");
    let log_path = dir.path().join("logs/bot.log");
    let h = harness_with_log(LogSink::to_file(&log_path));
    fill_form(&h, SUBMITTER);

    assert_eq!(
        h.engine.handle_event(&press(SUBMITTER, "confirm_100")),
        EventOutcome::Handled
    );
    let published = h.channel.sent_to(broadcast());
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].text, expected_render());
    assert!(published[0].markup.is_none());

    let last = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .pop()
        .expect("ack");
    assert_eq!(last.text, DIRECT_PUBLISHED);
    assert!(matches!(last.markup, Some(Markup::Menu(_))));
    assert!(h.sessions.get(UserId::new(SUBMITTER)).is_none());

    let log = fs::read_to_string(&log_path).expect("log file");
    assert!(log.contains("\"event\":\"submission.published\""));
}

#[test]
fn second_press_finds_no_session_and_publishes_nothing() {
    let h = harness();
    fill_form(&h, SUBMITTER);
    assert_eq!(
        h.engine.handle_event(&press(SUBMITTER, "confirm_100")),
        EventOutcome::Handled
    );
    h.channel.clear_sent();

    let outcome = h.engine.handle_event(&press(SUBMITTER, "confirm_100"));
    assert!(matches!(outcome, EventOutcome::Failed(_)));
    assert!(h.channel.sent_to(broadcast()).is_empty());

    let replies = h.channel.sent_to(UserId::new(SUBMITTER));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, NOTICE_SESSION_MISSING);
}

#[test]
fn cancel_discards_the_submission_without_publishing() {
    let h = harness();
    fill_form(&h, SUBMITTER);

    assert_eq!(
        h.engine.handle_event(&press(SUBMITTER, "cancel_100")),
        EventOutcome::Handled
    );
    assert!(h.channel.sent_to(broadcast()).is_empty());
    assert!(h.sessions.get(UserId::new(SUBMITTER)).is_none());
    let last = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .pop()
        .expect("ack");
    assert_eq!(last.text, DIRECT_CANCELLED);
}

#[test]
fn second_cancel_hits_session_missing() {
    let h = harness();
    fill_form(&h, SUBMITTER);
    assert_eq!(
        h.engine.handle_event(&press(SUBMITTER, "cancel_100")),
        EventOutcome::Handled
    );
    h.channel.clear_sent();

    let outcome = h.engine.handle_event(&press(SUBMITTER, "cancel_100"));
    assert!(matches!(outcome, EventOutcome::Failed(_)));
    let replies: Vec<String> = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(replies, vec![NOTICE_SESSION_MISSING.to_string()]);
    assert!(!replies.iter().any(|t| t == DIRECT_CANCELLED));
    assert!(h.channel.sent_to(broadcast()).is_empty());
}

#[test]
fn bare_legacy_tokens_resolve_to_the_presser() {
    let h = harness();
    fill_form(&h, SUBMITTER);

    assert_eq!(
        h.engine.handle_event(&press(SUBMITTER, "confirm")),
        EventOutcome::Handled
    );
    assert_eq!(h.channel.sent_to(broadcast()).len(), 1);
}

#[test]
fn only_the_submitter_may_decide_in_direct_mode() {
    let h = harness();
    fill_form(&h, SUBMITTER);

    let outcome = h.engine.handle_event(&press(555, "confirm_100"));
    assert!(matches!(outcome, EventOutcome::Failed(_)));
    assert!(h.channel.sent_to(broadcast()).is_empty());
    assert_eq!(
        h.sessions.get(UserId::new(SUBMITTER)).map(|s| s.step()),
        Some(Step::AwaitingConfirmation)
    );
    let notice = h.channel.sent_to(UserId::new(555));
    assert_eq!(notice.len(), 1);
    assert_eq!(notice[0].text, NOTICE_SESSION_MISSING);
}

#[test]
fn malformed_and_out_of_mode_tokens_change_nothing() {
    let h = harness();
    fill_form(&h, SUBMITTER);

    for token in ["confirm_", "confirm_abc", "publish_100", "reject_100", ""] {
        let outcome = h.engine.handle_event(&press(SUBMITTER, token));
        assert!(
            matches!(outcome, EventOutcome::Failed(_)),
            "token `{token}` was accepted"
        );
    }
    assert!(h.channel.sent_to(broadcast()).is_empty());
    assert_eq!(
        h.sessions.get(UserId::new(SUBMITTER)).map(|s| s.step()),
        Some(Step::AwaitingConfirmation)
    );
}

#[test]
fn broadcast_failure_reports_a_transport_problem_and_never_claims_success() {
    let h = harness();
    fill_form(&h, SUBMITTER);
    h.channel.fail_sends_to(broadcast());

    let outcome = h.engine.handle_event(&press(SUBMITTER, "confirm_100"));
    assert!(matches!(outcome, EventOutcome::Failed(_)));

    let replies: Vec<String> = h
        .channel
        .sent_to(UserId::new(SUBMITTER))
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert!(!replies.iter().any(|t| t == DIRECT_PUBLISHED));
    assert_eq!(replies.last().map(String::as_str), Some(NOTICE_TRANSPORT));
    assert!(h.sessions.get(UserId::new(SUBMITTER)).is_none());
    assert_eq!(h.channel.failed_send_count(), 1);
}

#[test]
fn failed_prompt_leaves_the_form_step_uncommitted() {
    let h = harness();
    h.engine.handle_event(&text(SUBMITTER, LABEL_PROFESSORS));
    h.channel.fail_sends_to(UserId::new(SUBMITTER));

    let outcome = h.engine.handle_event(&text(SUBMITTER, "Physics"));
    assert!(matches!(outcome, EventOutcome::Failed(_)));
    let session = h.sessions.get(UserId::new(SUBMITTER)).expect("session");
    assert_eq!(session.step(), Step::AwaitingCourse);
    assert_eq!(session.captured_fields(), 0);

    h.channel.restore_sends_to(UserId::new(SUBMITTER));
    assert_eq!(
        h.engine.handle_event(&text(SUBMITTER, "Physics")),
        EventOutcome::Handled
    );
    let session = h.sessions.get(UserId::new(SUBMITTER)).expect("session");
    assert_eq!(session.step(), Step::AwaitingInstructor);
    assert_eq!(session.field(Field::Course), Some("Physics"));
}

#[test]
fn empty_answers_are_accepted_verbatim() {
    let h = harness();
    h.engine.handle_event(&text(SUBMITTER, LABEL_PROFESSORS));
    for input in ["", "", ""] {
        assert_eq!(h.engine.handle_event(&text(SUBMITTER, input)), EventOutcome::Handled);
    }
    let session = h.sessions.get(UserId::new(SUBMITTER)).expect("session");
    assert_eq!(session.step(), Step::AwaitingConfirmation);
    assert_eq!(session.field(Field::Question), Some(""));
}
