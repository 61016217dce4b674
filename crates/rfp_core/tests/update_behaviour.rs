use std::sync::Once;

use pretty_assertions::assert_eq;
use rfp_core::{
    update, AppState, ChatMessage, Effect, JobRecord, JobStatus, Msg, Notice, Page, PollTarget,
    Role,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(rfp_logging::initialize_for_tests);
}

fn navigate(state: AppState, page: Page) -> (AppState, Vec<Effect>) {
    update(state, Msg::Navigate(page))
}

#[test]
fn navigating_to_upload_loads_rfps_and_watches_in_progress() {
    init_logging();
    let (mut state, effects) = navigate(AppState::new(), Page::Upload);

    assert_eq!(state.page(), Page::Upload);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![
            Effect::LoadRfps { request: 1 },
            Effect::StartPolling {
                request: 2,
                target: PollTarget::InProgressRfps,
            },
        ]
    );

    let (state, effects) = navigate(state, Page::Upload);
    assert!(effects.is_empty());
    assert_eq!(state.page(), Page::Upload);
}

#[test]
fn rfp_list_arrives_for_sidebar() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Analyzer);
    let (state, _) = update(
        state,
        Msg::RfpsLoaded {
            request: 1,
            result: Ok(vec![JobRecord::new("RFP1", JobStatus::Complete)]),
        },
    );
    assert_eq!(state.view().rfps, vec![JobRecord::new("RFP1", JobStatus::Complete)]);
    assert!(state.outstanding_requests().is_empty());
}

#[test]
fn upload_without_file_is_noop() {
    init_logging();
    let (mut state, _) = navigate(AppState::new(), Page::Upload);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::UploadClicked);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert!(!state.view().upload.uploading);
}

#[test]
fn upload_success_restarts_polling() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Upload);
    let (state, _) = update(state, Msg::FileChosen(Some("rfp.pdf".to_string())));
    let (state, effects) = update(state, Msg::UploadClicked);

    assert_eq!(
        effects,
        vec![Effect::Upload {
            request: 3,
            path: "rfp.pdf".to_string(),
        }]
    );
    assert!(state.view().upload.uploading);

    // A second click while in flight does nothing.
    let (state, effects) = update(state, Msg::UploadClicked);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            request: 3,
            result: Ok("File uploaded successfully".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Cancel { request: 2 },
            Effect::StartPolling {
                request: 4,
                target: PollTarget::InProgressRfps,
            },
        ]
    );
    let view = state.view();
    assert!(!view.upload.uploading);
    assert!(view.upload.polling);
    assert_eq!(
        view.notice,
        Some(Notice::Info("File uploaded successfully".to_string()))
    );

    let (state, _) = update(
        state,
        Msg::JobsPolled {
            request: 4,
            result: Ok(vec![JobRecord::new("rfp.pdf", JobStatus::Processing)]),
        },
    );
    let (state, _) = update(
        state,
        Msg::JobsPolled {
            request: 4,
            result: Ok(vec![JobRecord::new("rfp.pdf", JobStatus::Complete)]),
        },
    );
    let (state, _) = update(state, Msg::PollingStopped { request: 4 });

    let view = state.view();
    assert_eq!(view.upload.jobs, vec![JobRecord::new("rfp.pdf", JobStatus::Complete)]);
    assert!(!view.upload.polling);
}

#[test]
fn upload_failure_surfaces_error_and_does_not_poll() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Upload);
    let (state, _) = update(state, Msg::FileChosen(Some("rfp.pdf".to_string())));
    let (state, _) = update(state, Msg::UploadClicked);
    let (state, effects) = update(
        state,
        Msg::UploadFinished {
            request: 3,
            result: Err("No selected file".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.upload.uploading);
    assert_eq!(view.notice, Some(Notice::Error("No selected file".to_string())));
}

#[test]
fn failed_poll_tick_leaves_list_untouched() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Upload);
    let (state, _) = update(
        state,
        Msg::JobsPolled {
            request: 2,
            result: Ok(vec![JobRecord::new("a.pdf", JobStatus::Processing)]),
        },
    );
    let (mut state, _) = update(state, Msg::Tick);
    state.consume_dirty();

    let (mut state, effects) = update(
        state,
        Msg::JobsPolled {
            request: 2,
            result: Err("connection refused".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert_eq!(
        state.view().upload.jobs,
        vec![JobRecord::new("a.pdf", JobStatus::Processing)]
    );
    assert!(state.view().upload.polling);
}

#[test]
fn chat_streams_into_a_single_assistant_turn() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Analyzer);
    let (state, effects) = update(state, Msg::RfpSelected("RFP1".to_string()));
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::ChatInputChanged("Summarize".to_string()));
    let (state, effects) = update(state, Msg::ChatSubmitted);
    assert_eq!(
        effects,
        vec![Effect::StreamChat {
            request: 2,
            rfp: "RFP1".to_string(),
            message: "Summarize".to_string(),
        }]
    );
    assert!(state.view().analyzer.streaming);
    assert_eq!(state.view().analyzer.input, "");

    let mut state = state;
    let mut seen = Vec::new();
    for chunk in ["Hel", "lo, ", "world"] {
        let (next, _) = update(
            state,
            Msg::StreamChunk {
                request: 2,
                text: chunk.to_string(),
            },
        );
        seen.push(next.view().analyzer.messages.last().unwrap().content.clone());
        state = next;
    }
    assert_eq!(seen, vec!["Hel", "Hello, ", "Hello, world"]);

    let (state, _) = update(
        state,
        Msg::StreamFinished {
            request: 2,
            result: Ok(()),
        },
    );
    let view = state.view();
    assert!(!view.analyzer.streaming);
    assert_eq!(
        view.analyzer.messages,
        vec![
            ChatMessage::new(Role::System, "Initial analysis for RFP RFP1"),
            ChatMessage::new(Role::User, "Summarize"),
            ChatMessage::new(Role::Assistant, "Hello, world"),
        ]
    );
}

#[test]
fn chat_ignores_blank_input_and_repeat_sends() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Analyzer);
    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, _) = update(state, Msg::ChatInputChanged("   ".to_string()));
    let (state, effects) = update(state, Msg::ChatSubmitted);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::ChatInputChanged("one".to_string()));
    let (state, _) = update(state, Msg::ChatSubmitted);
    let (state, _) = update(state, Msg::ChatInputChanged("two".to_string()));
    let (state, effects) = update(state, Msg::ChatSubmitted);
    assert!(effects.is_empty());
    assert_eq!(state.view().analyzer.input, "two");
}

#[test]
fn chat_stream_error_clears_flag_and_reports() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Analyzer);
    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, _) = update(state, Msg::ChatInputChanged("hi".to_string()));
    let (state, _) = update(state, Msg::ChatSubmitted);
    let (state, _) = update(
        state,
        Msg::StreamChunk {
            request: 2,
            text: "partial".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StreamFinished {
            request: 2,
            result: Err("stream aborted".to_string()),
        },
    );

    let view = state.view();
    assert!(!view.analyzer.streaming);
    let last_two: Vec<_> = view.analyzer.messages.iter().rev().take(2).cloned().collect();
    assert_eq!(
        last_two,
        vec![
            ChatMessage::new(Role::System, "Error: stream aborted"),
            ChatMessage::new(Role::Assistant, "partial"),
        ]
    );
}

#[test]
fn navigating_away_cancels_outstanding_work_and_drops_late_events() {
    init_logging();
    let (state, _) = navigate(AppState::new(), Page::Analyzer);
    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, _) = update(state, Msg::ChatInputChanged("hi".to_string()));
    let (state, _) = update(state, Msg::ChatSubmitted);

    let (mut state, effects) = navigate(state, Page::Upload);
    assert_eq!(
        effects,
        vec![
            Effect::Cancel { request: 1 },
            Effect::Cancel { request: 2 },
            Effect::LoadRfps { request: 3 },
            Effect::StartPolling {
                request: 4,
                target: PollTarget::InProgressRfps,
            },
        ]
    );
    assert!(state.consume_dirty());
    assert!(state.selected_rfp().is_none());

    let (mut state, effects) = update(
        state,
        Msg::StreamChunk {
            request: 2,
            text: "late".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());

    let (mut state, _) = navigate(state, Page::Analyzer);
    state.consume_dirty();
    assert!(state.view().analyzer.messages.is_empty());
}
