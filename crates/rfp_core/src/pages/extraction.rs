use rfp_logging::rfp_debug;

use crate::state::{cancel_slot, expects, RequestIds};
use crate::{
    keeps_polling, ApproveOutcome, Effect, JobList, JobRecord, Notice, PollTarget, Progress,
    RequestId, RequirementFlag, Section, SectionReview,
};

/// Requirements extraction page: copilot review plus agent-mode extraction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionPage {
    pub(crate) copilot: bool,
    pub(crate) rfp: Option<String>,
    pub(crate) review: SectionReview,
    pub(crate) sections_request: Option<RequestId>,
    pub(crate) submit_request: Option<RequestId>,
    pub(crate) start_request: Option<RequestId>,
    pub(crate) progress: Progress,
    pub(crate) progress_poll: Option<RequestId>,
    pub(crate) progress_fetch: Option<RequestId>,
    pub(crate) artifacts: JobList,
    pub(crate) artifacts_poll: Option<RequestId>,
    pub(crate) notice: Option<Notice>,
}

impl ExtractionPage {
    pub(crate) fn outstanding(&self) -> impl Iterator<Item = RequestId> {
        self.sections_request
            .into_iter()
            .chain(self.submit_request)
            .chain(self.start_request)
            .chain(self.progress_poll)
            .chain(self.progress_fetch)
            .chain(self.artifacts_poll)
    }

    pub fn is_extracting(&self) -> bool {
        self.start_request.is_some() || self.progress_poll.is_some()
    }

    pub(crate) fn select(&mut self, rfp: &str, ids: &mut RequestIds, effects: &mut Vec<Effect>) {
        for request in self.outstanding().collect::<Vec<_>>() {
            effects.push(Effect::Cancel { request });
        }
        let copilot = self.copilot;
        *self = Self {
            copilot,
            rfp: Some(rfp.to_string()),
            ..Self::default()
        };

        let request = ids.next();
        self.sections_request = Some(request);
        effects.push(Effect::LoadSections {
            request,
            rfp: rfp.to_string(),
        });
        self.fetch_progress(ids, effects);
    }

    pub(crate) fn toggle_copilot(&mut self, copilot: bool) -> bool {
        if self.copilot == copilot {
            return false;
        }
        self.copilot = copilot;
        true
    }

    pub(crate) fn sections_loaded(
        &mut self,
        request: RequestId,
        result: Result<Vec<Section>, String>,
    ) -> bool {
        if !expects(self.sections_request, request, "sections") {
            return false;
        }
        self.sections_request = None;
        match (result, self.rfp.clone()) {
            (Ok(sections), Some(rfp)) => {
                self.review.load(rfp, sections);
                self.notice = None;
            }
            (Ok(_), None) => {}
            (Err(err), _) => self.notice = Some(Notice::Error(err)),
        }
        true
    }

    pub(crate) fn previous_section(&mut self) -> bool {
        self.review.previous()
    }

    pub(crate) fn next_section(&mut self) -> bool {
        self.review.next()
    }

    pub(crate) fn mark_requirement(&mut self, index: usize, flag: RequirementFlag) -> bool {
        self.review.mark_requirement(index, flag)
    }

    pub(crate) fn notes_changed(&mut self, notes: String) -> bool {
        self.review.set_analysis(notes);
        true
    }

    /// Submit the current section's judgements. No-op while a submit is in
    /// flight or when nothing is loaded.
    pub(crate) fn approve(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) -> bool {
        let Some(submission) = self.review.begin_approve() else {
            return false;
        };
        let request = ids.next();
        self.submit_request = Some(request);
        effects.push(Effect::SubmitSection {
            request,
            submission,
        });
        true
    }

    pub(crate) fn section_submitted(
        &mut self,
        request: RequestId,
        result: Result<String, String>,
        ids: &mut RequestIds,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if !expects(self.submit_request, request, "section submit") {
            return false;
        }
        self.submit_request = None;
        match result {
            Ok(_) => {
                let outcome = self.review.approve_succeeded();
                self.notice = match outcome {
                    Some(ApproveOutcome::AtEnd) => {
                        Some(Notice::Info("All sections reviewed".to_string()))
                    }
                    _ => None,
                };
                self.fetch_progress(ids, effects);
            }
            Err(err) => {
                self.review.approve_failed();
                self.notice = Some(Notice::Error(err));
            }
        }
        true
    }

    /// Agent mode: ask the server to extract every section.
    pub(crate) fn start_extraction(
        &mut self,
        ids: &mut RequestIds,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if self.is_extracting() {
            return false;
        }
        let Some(rfp) = self.rfp.clone() else {
            self.notice = Some(Notice::Error("Select an RFP to start".to_string()));
            return true;
        };
        let request = ids.next();
        self.start_request = Some(request);
        effects.push(Effect::StartExtraction { request, rfp });
        true
    }

    pub(crate) fn extraction_started(
        &mut self,
        request: RequestId,
        result: Result<String, String>,
        ids: &mut RequestIds,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if !expects(self.start_request, request, "start extraction") {
            return false;
        }
        self.start_request = None;
        match (result, self.rfp.clone()) {
            (Ok(message), Some(rfp)) => {
                self.notice = Some(Notice::Info(message));
                cancel_slot(&mut self.progress_poll, effects);
                let request = ids.next();
                self.progress_poll = Some(request);
                effects.push(Effect::StartPolling {
                    request,
                    target: PollTarget::ExtractionProgress { rfp },
                });
            }
            (Ok(_), None) => {}
            (Err(err), _) => self.notice = Some(Notice::Error(err)),
        }
        true
    }

    fn fetch_progress(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) {
        let Some(rfp) = self.rfp.clone() else {
            return;
        };
        cancel_slot(&mut self.progress_fetch, effects);
        let request = ids.next();
        self.progress_fetch = Some(request);
        effects.push(Effect::FetchProgress { request, rfp });
    }

    pub(crate) fn progress_fetched(
        &mut self,
        request: RequestId,
        result: Result<Progress, String>,
    ) -> bool {
        if !expects(self.progress_fetch, request, "progress") {
            return false;
        }
        self.progress_fetch = None;
        match result {
            Ok(progress) => self.progress = progress,
            Err(err) => rfp_debug!("Progress request {} failed: {}", request, err),
        }
        true
    }

    /// The extraction job's own percentage; review progress is left as last
    /// fetched.
    pub(crate) fn extraction_polled(
        &mut self,
        request: RequestId,
        result: Result<f32, String>,
    ) -> bool {
        if !expects(self.progress_poll, request, "extraction progress") {
            return false;
        }
        match result {
            Ok(percent) => {
                let progress = Progress::new(percent, self.progress.review);
                let changed = self.progress != progress;
                self.progress = progress;
                changed
            }
            Err(err) => {
                rfp_debug!("Extraction progress {} failed: {}", request, err);
                false
            }
        }
    }

    /// Start watching artifacts of `kind` for the selected RFP, replacing any
    /// previous watch.
    pub(crate) fn watch_artifacts(
        &mut self,
        kind: String,
        ids: &mut RequestIds,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let Some(rfp) = self.rfp.clone() else {
            return false;
        };
        cancel_slot(&mut self.artifacts_poll, effects);
        self.artifacts.clear();
        let request = ids.next();
        self.artifacts_poll = Some(request);
        effects.push(Effect::StartPolling {
            request,
            target: PollTarget::Artifacts { rfp, kind },
        });
        true
    }

    pub(crate) fn owns_jobs_poll(&self, request: RequestId) -> bool {
        self.artifacts_poll == Some(request)
    }

    pub(crate) fn artifacts_polled(
        &mut self,
        request: RequestId,
        result: Result<Vec<JobRecord>, String>,
    ) -> bool {
        if !expects(self.artifacts_poll, request, "artifacts poll") {
            return false;
        }
        match result {
            Ok(batch) => {
                if !keeps_polling(&batch) {
                    rfp_debug!("No artifact is processing; poll {} winding down", request);
                }
                self.artifacts.merge(batch)
            }
            Err(_) => false,
        }
    }

    pub(crate) fn polling_stopped(&mut self, request: RequestId) -> bool {
        if self.progress_poll == Some(request) {
            self.progress_poll = None;
            if self.progress.extraction_done() {
                self.notice = Some(Notice::Info("Extraction complete".to_string()));
            }
            true
        } else if self.artifacts_poll == Some(request) {
            self.artifacts_poll = None;
            true
        } else {
            false
        }
    }
}
