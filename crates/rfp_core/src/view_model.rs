use crate::{
    AppState, ChatMessage, JobRecord, Notice, Page, Progress, Requirement, Section,
};

/// Snapshot of everything a front end needs to draw the active page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub page: Page,
    pub rfps: Vec<JobRecord>,
    pub loading_rfps: bool,
    pub selected_rfp: Option<String>,
    pub notice: Option<Notice>,
    pub upload: UploadView,
    pub analyzer: AnalyzerView,
    pub extraction: ExtractionView,
    pub builder: BuilderView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub file: Option<String>,
    pub uploading: bool,
    pub polling: bool,
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyzerView {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionView {
    pub copilot: bool,
    pub loading_sections: bool,
    pub section_index: usize,
    pub section_count: usize,
    pub current_section: Option<Section>,
    pub has_previous: bool,
    pub has_next: bool,
    pub reviewed_count: usize,
    pub submitting: bool,
    pub extracting: bool,
    pub progress: Progress,
    pub artifacts: Vec<JobRecord>,
    pub watching_artifacts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuilderView {
    pub loading: bool,
    pub index: usize,
    pub count: usize,
    pub current: Option<Requirement>,
    pub instruction: String,
    pub generated: String,
    pub generating: bool,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let upload = &state.upload;
        let analyzer = &state.analyzer;
        let extraction = &state.extraction;
        let review = &extraction.review;
        let builder = &state.builder;

        Self {
            page: state.page(),
            rfps: state.rfps().to_vec(),
            loading_rfps: state.is_loading_rfps(),
            selected_rfp: state.selected_rfp().map(ToOwned::to_owned),
            notice: state.notice().cloned(),
            upload: UploadView {
                file: upload.file.clone(),
                uploading: upload.is_uploading(),
                polling: upload.is_polling(),
                jobs: upload.jobs.entries().to_vec(),
            },
            analyzer: AnalyzerView {
                messages: analyzer.transcript.messages().to_vec(),
                input: analyzer.input.clone(),
                streaming: analyzer.is_streaming(),
            },
            extraction: ExtractionView {
                copilot: extraction.copilot,
                loading_sections: extraction.sections_request.is_some(),
                section_index: review.index(),
                section_count: review.len(),
                current_section: review.current().cloned(),
                has_previous: review.has_previous(),
                has_next: review.has_next(),
                reviewed_count: review.reviewed_count(),
                submitting: review.is_submitting(),
                extracting: extraction.is_extracting(),
                progress: extraction.progress,
                artifacts: extraction.artifacts.entries().to_vec(),
                watching_artifacts: extraction.artifacts_poll.is_some(),
            },
            builder: BuilderView {
                loading: builder.requirements_request.is_some(),
                index: builder.index,
                count: builder.requirements.len(),
                current: builder.current().cloned(),
                instruction: builder.instruction.clone(),
                generated: builder.generated().to_string(),
                generating: builder.is_generating(),
            },
        }
    }
}
