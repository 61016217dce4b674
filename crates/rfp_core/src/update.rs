use rfp_logging::rfp_debug;

use crate::{AppState, Effect, Msg, Page};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    let page = state.page();

    let changed = match msg {
        Msg::Navigate(target) => state.navigate(target, &mut effects),
        Msg::RfpSelected(rfp) => state.select_rfp(rfp, &mut effects),
        Msg::RfpsLoaded { request, result } => state.rfps_loaded(request, result),

        Msg::FileChosen(file) if page == Page::Upload => state.upload.choose_file(file),
        Msg::UploadClicked if page == Page::Upload => {
            let (upload, ids) = state.upload_and_ids();
            upload.start_upload(ids, &mut effects)
        }
        Msg::UploadFinished { request, result } => {
            let (upload, ids) = state.upload_and_ids();
            upload.upload_finished(request, result, ids, &mut effects)
        }

        Msg::JobsPolled { request, result } => {
            if state.extraction.owns_jobs_poll(request) {
                state.extraction.artifacts_polled(request, result)
            } else {
                state.upload.jobs_polled(request, result)
            }
        }
        Msg::ProgressFetched { request, result } => {
            state.extraction.progress_fetched(request, result)
        }
        Msg::ExtractionProgressPolled { request, result } => {
            state.extraction.extraction_polled(request, result)
        }
        Msg::PollFailed { request, error } => {
            rfp_debug!("Poll {} tick failed: {}", request, error);
            false
        }
        Msg::PollingStopped { request } => {
            state.upload.polling_stopped(request) || state.extraction.polling_stopped(request)
        }

        Msg::ChatInputChanged(text) if page == Page::Analyzer => {
            state.analyzer.input_changed(text)
        }
        Msg::ChatSubmitted if page == Page::Analyzer => {
            let (analyzer, ids) = state.analyzer_and_ids();
            analyzer.submit(ids, &mut effects)
        }
        Msg::StreamChunk { request, text } => {
            if state.builder.owns_stream(request) {
                state.builder.stream_chunk(request, &text)
            } else if state.analyzer.owns_stream(request) {
                state.analyzer.stream_chunk(request, &text)
            } else {
                rfp_debug!("Dropping stale stream chunk request={}", request);
                false
            }
        }
        Msg::StreamFinished { request, result } => {
            if state.builder.owns_stream(request) {
                state.builder.stream_finished(request, result)
            } else if state.analyzer.owns_stream(request) {
                state.analyzer.stream_finished(request, result)
            } else {
                rfp_debug!("Dropping stale stream end request={}", request);
                false
            }
        }

        Msg::CopilotModeToggled(on) if page == Page::Extraction => {
            state.extraction.toggle_copilot(on)
        }
        Msg::SectionsLoaded { request, result } => {
            state.extraction.sections_loaded(request, result)
        }
        Msg::PreviousSection if page == Page::Extraction => state.extraction.previous_section(),
        Msg::NextSection if page == Page::Extraction => state.extraction.next_section(),
        Msg::RequirementMarked { index, flag } if page == Page::Extraction => {
            state.extraction.mark_requirement(index, flag)
        }
        Msg::ReviewNotesChanged(notes) if page == Page::Extraction => {
            state.extraction.notes_changed(notes)
        }
        Msg::ApproveClicked if page == Page::Extraction => {
            let (extraction, ids) = state.extraction_and_ids();
            extraction.approve(ids, &mut effects)
        }
        Msg::SectionSubmitted { request, result } => {
            let (extraction, ids) = state.extraction_and_ids();
            extraction.section_submitted(request, result, ids, &mut effects)
        }
        Msg::StartExtractionClicked if page == Page::Extraction => {
            let (extraction, ids) = state.extraction_and_ids();
            extraction.start_extraction(ids, &mut effects)
        }
        Msg::ExtractionStarted { request, result } => {
            let (extraction, ids) = state.extraction_and_ids();
            extraction.extraction_started(request, result, ids, &mut effects)
        }
        Msg::WatchArtifacts { kind } if page == Page::Extraction => {
            let (extraction, ids) = state.extraction_and_ids();
            extraction.watch_artifacts(kind, ids, &mut effects)
        }

        Msg::RequirementsLoaded { request, result } => {
            state.builder.requirements_loaded(request, result)
        }
        Msg::InstructionChanged(text) if page == Page::ResponseBuilder => {
            state.builder.instruction_changed(text)
        }
        Msg::PreviousRequirement if page == Page::ResponseBuilder => state.builder.previous(),
        Msg::NextRequirement if page == Page::ResponseBuilder => state.builder.next(),
        Msg::GenerateClicked if page == Page::ResponseBuilder => {
            let (builder, ids) = state.builder_and_ids();
            builder.generate(ids, &mut effects)
        }

        // Input aimed at a page that is not mounted.
        Msg::FileChosen(_)
        | Msg::UploadClicked
        | Msg::ChatInputChanged(_)
        | Msg::ChatSubmitted
        | Msg::CopilotModeToggled(_)
        | Msg::PreviousSection
        | Msg::NextSection
        | Msg::RequirementMarked { .. }
        | Msg::ReviewNotesChanged(_)
        | Msg::ApproveClicked
        | Msg::StartExtractionClicked
        | Msg::WatchArtifacts { .. }
        | Msg::InstructionChanged(_)
        | Msg::PreviousRequirement
        | Msg::NextRequirement
        | Msg::GenerateClicked => false,

        Msg::Tick | Msg::NoOp => false,
    };

    if changed {
        state.mark_dirty();
    }
    (state, effects)
}
