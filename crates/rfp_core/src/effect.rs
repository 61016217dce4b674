use crate::{Requirement, RequestId, SectionSubmission};

/// Side effects requested by [`crate::update`]. Each carries the id the
/// engine echoes back on the matching event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadRfps {
        request: RequestId,
    },
    Upload {
        request: RequestId,
        path: String,
    },
    StartPolling {
        request: RequestId,
        target: PollTarget,
    },
    /// Stop whatever task is running under `request`. Unknown ids are ignored.
    Cancel {
        request: RequestId,
    },
    StreamChat {
        request: RequestId,
        rfp: String,
        message: String,
    },
    LoadSections {
        request: RequestId,
        rfp: String,
    },
    SubmitSection {
        request: RequestId,
        submission: SectionSubmission,
    },
    StartExtraction {
        request: RequestId,
        rfp: String,
    },
    FetchProgress {
        request: RequestId,
        rfp: String,
    },
    LoadRequirements {
        request: RequestId,
        rfp: String,
    },
    StreamResponse {
        request: RequestId,
        requirement: Requirement,
        user_message: String,
    },
}

impl Effect {
    pub fn request(&self) -> RequestId {
        match self {
            Effect::LoadRfps { request }
            | Effect::Upload { request, .. }
            | Effect::StartPolling { request, .. }
            | Effect::Cancel { request }
            | Effect::StreamChat { request, .. }
            | Effect::LoadSections { request, .. }
            | Effect::SubmitSection { request, .. }
            | Effect::StartExtraction { request, .. }
            | Effect::FetchProgress { request, .. }
            | Effect::LoadRequirements { request, .. }
            | Effect::StreamResponse { request, .. } => *request,
        }
    }
}

/// What a status poller fetches on each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// `GET /in-progress-rfps`
    InProgressRfps,
    /// `GET /artifacts?rfp=&type=`
    Artifacts { rfp: String, kind: String },
    /// `GET /extraction-progress?rfp_name=`; keeps going until the
    /// extraction job reaches 100%.
    ExtractionProgress { rfp: String },
}
