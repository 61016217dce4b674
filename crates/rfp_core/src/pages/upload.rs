use rfp_logging::rfp_debug;

use crate::state::{cancel_slot, expects, RequestIds};
use crate::{keeps_polling, Effect, JobList, JobRecord, Notice, PollTarget, RequestId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadPage {
    pub(crate) file: Option<String>,
    pub(crate) uploading: Option<RequestId>,
    pub(crate) jobs: JobList,
    pub(crate) poll: Option<RequestId>,
    pub(crate) notice: Option<Notice>,
}

impl UploadPage {
    pub(crate) fn outstanding(&self) -> impl Iterator<Item = RequestId> {
        self.uploading.into_iter().chain(self.poll)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub(crate) fn choose_file(&mut self, file: Option<String>) -> bool {
        let file = file.filter(|f| !f.trim().is_empty());
        if self.file == file {
            return false;
        }
        self.file = file;
        true
    }

    /// Start an upload of the chosen file. No file, or an upload already in
    /// flight, makes this a no-op.
    pub(crate) fn start_upload(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) -> bool {
        if self.uploading.is_some() {
            return false;
        }
        let Some(path) = self.file.clone() else {
            return false;
        };
        let request = ids.next();
        self.uploading = Some(request);
        self.notice = Some(Notice::Info(format!("Uploading {path}...")));
        effects.push(Effect::Upload { request, path });
        true
    }

    pub(crate) fn upload_finished(
        &mut self,
        request: RequestId,
        result: Result<String, String>,
        ids: &mut RequestIds,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if !expects(self.uploading, request, "upload") {
            return false;
        }
        self.uploading = None;
        match result {
            Ok(message) => {
                self.notice = Some(Notice::Info(message));
                self.watch_in_progress(ids, effects);
            }
            Err(err) => {
                self.notice = Some(Notice::Error(err));
            }
        }
        true
    }

    /// (Re)start the in-progress poll, replacing any poll already running.
    pub(crate) fn watch_in_progress(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) {
        cancel_slot(&mut self.poll, effects);
        let request = ids.next();
        self.poll = Some(request);
        effects.push(Effect::StartPolling {
            request,
            target: PollTarget::InProgressRfps,
        });
    }

    pub(crate) fn jobs_polled(
        &mut self,
        request: RequestId,
        result: Result<Vec<JobRecord>, String>,
    ) -> bool {
        if !expects(self.poll, request, "in-progress poll") {
            return false;
        }
        match result {
            Ok(batch) => {
                let done = !keeps_polling(&batch);
                let changed = self.jobs.merge(batch);
                if done {
                    rfp_debug!("No upload is processing; poll {} winding down", request);
                }
                changed
            }
            // A failed tick is a no-op; the engine already logged it.
            Err(_) => false,
        }
    }

    pub(crate) fn polling_stopped(&mut self, request: RequestId) -> bool {
        if self.poll == Some(request) {
            self.poll = None;
            true
        } else {
            false
        }
    }
}
