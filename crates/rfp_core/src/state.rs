use rfp_logging::rfp_debug;

use crate::pages::{AnalyzerPage, BuilderPage, ExtractionPage, UploadPage};
use crate::view_model::AppViewModel;
use crate::{Effect, JobList, JobRecord, RequestId};

/// Pages the router can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Main,
    Upload,
    Analyzer,
    Extraction,
    ResponseBuilder,
}

/// User-visible status line of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Monotonic request id allocator. Ids start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestIds {
    last: RequestId,
}

impl RequestIds {
    pub fn next(&mut self) -> RequestId {
        self.last += 1;
        self.last
    }
}

/// Cancel the request held in `slot`, if any, and clear the slot.
pub(crate) fn cancel_slot(slot: &mut Option<RequestId>, effects: &mut Vec<Effect>) {
    if let Some(request) = slot.take() {
        effects.push(Effect::Cancel { request });
    }
}

/// True if `request` is the one `slot` is waiting for. Logs stale events.
pub(crate) fn expects(slot: Option<RequestId>, request: RequestId, what: &str) -> bool {
    if slot == Some(request) {
        true
    } else {
        rfp_debug!(
            "Dropping stale {} event request={} expected={:?}",
            what,
            request,
            slot
        );
        false
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    page: Page,
    ids: RequestIds,
    rfps: JobList,
    rfps_request: Option<RequestId>,
    selected_rfp: Option<String>,
    pub(crate) upload: UploadPage,
    pub(crate) analyzer: AnalyzerPage,
    pub(crate) extraction: ExtractionPage,
    pub(crate) builder: BuilderPage,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn selected_rfp(&self) -> Option<&str> {
        self.selected_rfp.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn rfps(&self) -> &[JobRecord] {
        self.rfps.entries()
    }

    pub fn is_loading_rfps(&self) -> bool {
        self.rfps_request.is_some()
    }

    /// Returns true if the state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Every request the active page is still waiting on.
    pub fn outstanding_requests(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.rfps_request.into_iter().collect();
        match self.page {
            Page::Main => {}
            Page::Upload => ids.extend(self.upload.outstanding()),
            Page::Analyzer => ids.extend(self.analyzer.outstanding()),
            Page::Extraction => ids.extend(self.extraction.outstanding()),
            Page::ResponseBuilder => ids.extend(self.builder.outstanding()),
        }
        ids
    }

    /// Switch pages: cancel the old page's work, discard its state, and issue
    /// the new page's initial loads.
    pub(crate) fn navigate(&mut self, page: Page, effects: &mut Vec<Effect>) -> bool {
        if page == self.page {
            return false;
        }
        for request in self.outstanding_requests() {
            effects.push(Effect::Cancel { request });
        }
        self.rfps_request = None;
        self.rfps.clear();
        self.selected_rfp = None;
        match self.page {
            Page::Main => {}
            Page::Upload => self.upload = UploadPage::default(),
            Page::Analyzer => self.analyzer = AnalyzerPage::default(),
            Page::Extraction => self.extraction = ExtractionPage::default(),
            Page::ResponseBuilder => self.builder = BuilderPage::default(),
        }
        self.page = page;

        if page != Page::Main {
            let request = self.ids.next();
            self.rfps_request = Some(request);
            effects.push(Effect::LoadRfps { request });
        }
        if page == Page::Upload {
            self.upload.watch_in_progress(&mut self.ids, effects);
        }
        true
    }

    pub(crate) fn select_rfp(&mut self, rfp: String, effects: &mut Vec<Effect>) -> bool {
        let rfp = rfp.trim().to_string();
        if rfp.is_empty() {
            return false;
        }
        let handled = match self.page {
            Page::Main | Page::Upload => false,
            Page::Analyzer => {
                self.analyzer.select(&rfp, effects);
                true
            }
            Page::Extraction => {
                self.extraction.select(&rfp, &mut self.ids, effects);
                true
            }
            Page::ResponseBuilder => {
                self.builder.select(&rfp, &mut self.ids, effects);
                true
            }
        };
        if handled {
            self.selected_rfp = Some(rfp);
        }
        handled
    }

    pub(crate) fn rfps_loaded(
        &mut self,
        request: RequestId,
        result: Result<Vec<JobRecord>, String>,
    ) -> bool {
        if !expects(self.rfps_request, request, "rfp list") {
            return false;
        }
        self.rfps_request = None;
        match result {
            Ok(rfps) => {
                self.rfps.merge(rfps);
            }
            Err(err) => {
                rfp_debug!("RFP list failed: {}", err);
                let notice = Notice::Error(format!("Could not load RFPs: {err}"));
                self.set_notice(notice);
            }
        }
        true
    }

    pub(crate) fn upload_and_ids(&mut self) -> (&mut UploadPage, &mut RequestIds) {
        (&mut self.upload, &mut self.ids)
    }

    pub(crate) fn analyzer_and_ids(&mut self) -> (&mut AnalyzerPage, &mut RequestIds) {
        (&mut self.analyzer, &mut self.ids)
    }

    pub(crate) fn extraction_and_ids(&mut self) -> (&mut ExtractionPage, &mut RequestIds) {
        (&mut self.extraction, &mut self.ids)
    }

    pub(crate) fn builder_and_ids(&mut self) -> (&mut BuilderPage, &mut RequestIds) {
        (&mut self.builder, &mut self.ids)
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        match self.page {
            Page::Main => {}
            Page::Upload => self.upload.notice = Some(notice),
            Page::Analyzer => self.analyzer.notice = Some(notice),
            Page::Extraction => self.extraction.notice = Some(notice),
            Page::ResponseBuilder => self.builder.notice = Some(notice),
        }
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        match self.page {
            Page::Main => None,
            Page::Upload => self.upload.notice.as_ref(),
            Page::Analyzer => self.analyzer.notice.as_ref(),
            Page::Extraction => self.extraction.notice.as_ref(),
            Page::ResponseBuilder => self.builder.notice.as_ref(),
        }
    }
}
