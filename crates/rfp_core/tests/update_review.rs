use std::sync::Once;

use pretty_assertions::assert_eq;
use rfp_core::{
    update, AppState, Effect, Msg, Notice, Page, PollTarget, Progress, Requirement,
    RequirementFlag, RequirementJudgements, Section, SectionSubmission,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(rfp_logging::initialize_for_tests);
}

fn requirement(content: &str, flag: RequirementFlag) -> Requirement {
    Requirement {
        section_name: "Scope".to_string(),
        section_number: "1.1".to_string(),
        page_number: "3".to_string(),
        content: content.to_string(),
        is_requirement: flag,
    }
}

fn section(id: &str) -> Section {
    Section {
        section_id: id.to_string(),
        content: format!("Body of {id}"),
        requirements: vec![requirement(&format!("{id} shall work"), RequirementFlag::Yes)],
        reviewed: false,
    }
}

/// Extraction page with RFP1 selected and two sections loaded.
/// Request ids 1..=3 are used up (rfp list, sections, progress).
fn loaded_rfp1() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Navigate(Page::Extraction));
    let (state, effects) = update(state, Msg::RfpSelected("RFP1".to_string()));
    assert_eq!(
        effects,
        vec![
            Effect::LoadSections {
                request: 2,
                rfp: "RFP1".to_string(),
            },
            Effect::FetchProgress {
                request: 3,
                rfp: "RFP1".to_string(),
            },
        ]
    );
    let (state, _) = update(
        state,
        Msg::SectionsLoaded {
            request: 2,
            result: Ok(vec![section("s1"), section("s2")]),
        },
    );
    state
}

#[test]
fn selecting_rfp_loads_sections_at_index_zero() {
    init_logging();
    let state = loaded_rfp1();
    let view = state.view().extraction;

    assert_eq!(view.section_count, 2);
    assert_eq!(view.section_index, 0);
    assert_eq!(view.current_section.map(|s| s.section_id), Some("s1".to_string()));
    assert!(!view.has_previous);
    assert!(view.has_next);
}

#[test]
fn navigation_is_clamped_at_both_ends() {
    init_logging();
    let state = loaded_rfp1();

    let (mut state, _) = update(state, Msg::PreviousSection);
    assert_eq!(state.view().extraction.section_index, 0);
    state.consume_dirty();

    let (state, _) = update(state, Msg::NextSection);
    assert_eq!(state.view().extraction.section_index, 1);

    let (mut state, _) = update(state, Msg::Tick);
    state.consume_dirty();
    let (mut state, _) = update(state, Msg::NextSection);
    assert_eq!(state.view().extraction.section_index, 1);
    assert!(!state.consume_dirty());
}

#[test]
fn approve_then_failed_submit_keeps_cursor_and_flags() {
    init_logging();
    let state = loaded_rfp1();

    let (state, effects) = update(state, Msg::ApproveClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitSection {
            request: 4,
            submission: SectionSubmission {
                rfp_name: "RFP1".to_string(),
                section_id: "s1".to_string(),
                requirements: RequirementJudgements {
                    analysis: String::new(),
                    output: vec![requirement("s1 shall work", RequirementFlag::Yes)],
                },
            },
        }]
    );
    assert!(state.view().extraction.submitting);

    let (state, effects) = update(
        state,
        Msg::SectionSubmitted {
            request: 4,
            result: Ok("Requirements updated".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::Cancel { request: 3 },
            Effect::FetchProgress {
                request: 5,
                rfp: "RFP1".to_string(),
            },
        ]
    );
    let view = state.view().extraction;
    assert_eq!(view.section_index, 1);
    assert_eq!(view.reviewed_count, 1);

    let (state, _) = update(state, Msg::ApproveClicked);
    let (state, effects) = update(
        state,
        Msg::SectionSubmitted {
            request: 6,
            result: Err("An error occurred while updating the database".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.extraction.section_index, 1);
    assert_eq!(view.extraction.current_section.map(|s| s.reviewed), Some(false));
    assert_eq!(view.extraction.reviewed_count, 1);
    assert!(!view.extraction.submitting);
    assert_eq!(
        view.notice,
        Some(Notice::Error(
            "An error occurred while updating the database".to_string()
        ))
    );
}

#[test]
fn approving_last_section_marks_reviewed_without_advancing() {
    init_logging();
    let state = loaded_rfp1();
    let (state, _) = update(state, Msg::NextSection);
    let (state, _) = update(state, Msg::ApproveClicked);
    let (state, _) = update(
        state,
        Msg::SectionSubmitted {
            request: 4,
            result: Ok("ok".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.extraction.section_index, 1);
    assert_eq!(view.extraction.current_section.map(|s| s.reviewed), Some(true));
    assert_eq!(
        view.notice,
        Some(Notice::Info("All sections reviewed".to_string()))
    );
}

#[test]
fn approve_is_guarded_while_submitting() {
    init_logging();
    let state = loaded_rfp1();
    let (state, _) = update(state, Msg::ApproveClicked);
    let (state, effects) = update(state, Msg::ApproveClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::NextSection);
    assert_eq!(state.view().extraction.section_index, 0);
}

#[test]
fn marked_requirements_are_submitted() {
    init_logging();
    let state = loaded_rfp1();
    let (state, _) = update(
        state,
        Msg::RequirementMarked {
            index: 0,
            flag: RequirementFlag::No,
        },
    );
    let (state, _) = update(state, Msg::ReviewNotesChanged("not binding".to_string()));
    let (_state, effects) = update(state, Msg::ApproveClicked);

    match effects.as_slice() {
        [Effect::SubmitSection { submission, .. }] => {
            assert_eq!(submission.requirements.analysis, "not binding");
            assert_eq!(
                submission.requirements.output[0].is_requirement,
                RequirementFlag::No
            );
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn stale_sections_from_previous_rfp_are_dropped() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Navigate(Page::Extraction));
    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, effects) = update(state, Msg::RfpSelected("RFP2".to_string()));
    assert_eq!(
        effects,
        vec![
            Effect::Cancel { request: 2 },
            Effect::Cancel { request: 3 },
            Effect::LoadSections {
                request: 4,
                rfp: "RFP2".to_string(),
            },
            Effect::FetchProgress {
                request: 5,
                rfp: "RFP2".to_string(),
            },
        ]
    );

    let (state, _) = update(
        state,
        Msg::SectionsLoaded {
            request: 2,
            result: Ok(vec![section("old")]),
        },
    );
    assert_eq!(state.view().extraction.section_count, 0);
    assert_eq!(state.selected_rfp(), Some("RFP2"));
}

#[test]
fn agent_mode_starts_extraction_and_polls_progress() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Navigate(Page::Extraction));
    let (state, _) = update(state, Msg::StartExtractionClicked);
    assert_eq!(
        state.view().notice,
        Some(Notice::Error("Select an RFP to start".to_string()))
    );

    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, effects) = update(state, Msg::StartExtractionClicked);
    assert_eq!(
        effects,
        vec![Effect::StartExtraction {
            request: 4,
            rfp: "RFP1".to_string(),
        }]
    );
    assert!(state.view().extraction.extracting);

    let (state, effects) = update(state, Msg::StartExtractionClicked);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::ExtractionStarted {
            request: 4,
            result: Ok("Requirements extraction process started.".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            request: 5,
            target: PollTarget::ExtractionProgress {
                rfp: "RFP1".to_string(),
            },
        }]
    );

    let (state, _) = update(
        state,
        Msg::ExtractionProgressPolled {
            request: 5,
            result: Ok(50.0),
        },
    );
    assert_eq!(state.view().extraction.progress, Progress::new(50.0, 0.0));

    let (state, _) = update(
        state,
        Msg::ExtractionProgressPolled {
            request: 5,
            result: Ok(100.0),
        },
    );
    let (state, _) = update(state, Msg::PollingStopped { request: 5 });
    let view = state.view();
    assert!(!view.extraction.extracting);
    assert_eq!(view.notice, Some(Notice::Info("Extraction complete".to_string())));
}

#[test]
fn artifacts_are_watched_and_merged() {
    init_logging();
    let state = loaded_rfp1();
    let (state, effects) = update(
        state,
        Msg::WatchArtifacts {
            kind: "requirements".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            request: 4,
            target: PollTarget::Artifacts {
                rfp: "RFP1".to_string(),
                kind: "requirements".to_string(),
            },
        }]
    );

    let (state, _) = update(
        state,
        Msg::JobsPolled {
            request: 4,
            result: Ok(vec![rfp_core::JobRecord::new(
                "RFP1_requirements.xlsx",
                rfp_core::JobStatus::Processing,
            )]),
        },
    );
    assert_eq!(state.view().extraction.artifacts.len(), 1);
    assert!(state.view().extraction.watching_artifacts);
}

#[test]
fn sections_with_null_fields_still_load() {
    init_logging();
    let sections: Vec<Section> = serde_json::from_str(
        r#"[
            {"section_id": "s1", "content": null, "requirements": [{
                "section_name": null,
                "section_number": null,
                "page_number": 4,
                "content": null,
                "is_requirement": null
            }]},
            {"section_id": "s2", "content": "Pricing", "requirements": [{
                "section_name": "Costs",
                "content": "Fixed price",
                "is_requirement": "no"
            }]}
        ]"#,
    )
    .unwrap();

    let (state, _) = update(AppState::new(), Msg::Navigate(Page::Extraction));
    let (state, _) = update(state, Msg::RfpSelected("RFP1".to_string()));
    let (state, _) = update(
        state,
        Msg::SectionsLoaded {
            request: 2,
            result: Ok(sections),
        },
    );

    let view = state.view().extraction;
    assert_eq!(view.section_count, 2);
    let first = view.current_section.unwrap();
    assert_eq!(first.content, "");
    assert_eq!(
        first.requirements,
        vec![Requirement {
            page_number: "4".to_string(),
            ..Requirement::default()
        }]
    );
}

#[test]
fn extraction_poll_keeps_fetched_review_progress() {
    init_logging();
    let state = loaded_rfp1();
    let (state, _) = update(
        state,
        Msg::ProgressFetched {
            request: 3,
            result: Ok(Progress::new(10.0, 40.0)),
        },
    );
    let (state, _) = update(state, Msg::StartExtractionClicked);
    let (state, _) = update(
        state,
        Msg::ExtractionStarted {
            request: 4,
            result: Ok("started".to_string()),
        },
    );
    let (state, _) = update(
        state,
        Msg::ExtractionProgressPolled {
            request: 5,
            result: Ok(70.0),
        },
    );

    assert_eq!(state.view().extraction.progress, Progress::new(70.0, 40.0));
}
