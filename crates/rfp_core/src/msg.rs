use crate::{JobRecord, Page, Progress, Requirement, RequirementFlag, RequestId, Section};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User switched to another page.
    Navigate(Page),
    /// User picked an RFP in the sidebar of the active page.
    RfpSelected(String),
    /// Sidebar RFP list arrived.
    RfpsLoaded {
        request: RequestId,
        result: Result<Vec<JobRecord>, String>,
    },

    /// User picked (or cleared) the file to upload.
    FileChosen(Option<String>),
    UploadClicked,
    UploadFinished {
        request: RequestId,
        result: Result<String, String>,
    },

    /// One poll tick over a job list.
    JobsPolled {
        request: RequestId,
        result: Result<Vec<JobRecord>, String>,
    },
    /// One-shot `/progress` fetch (extraction and review percentages).
    ProgressFetched {
        request: RequestId,
        result: Result<Progress, String>,
    },
    /// One tick of the agent-mode extraction poll, in percent.
    ExtractionProgressPolled {
        request: RequestId,
        result: Result<f32, String>,
    },
    /// A poll tick failed. The poller keeps going; state is unchanged.
    PollFailed { request: RequestId, error: String },
    /// The poller under `request` has exited, for whatever reason.
    PollingStopped { request: RequestId },

    ChatInputChanged(String),
    ChatSubmitted,
    /// A decoded chunk of a streamed body.
    StreamChunk { request: RequestId, text: String },
    /// The stream under `request` ended, failed or was cancelled.
    StreamFinished {
        request: RequestId,
        result: Result<(), String>,
    },

    CopilotModeToggled(bool),
    SectionsLoaded {
        request: RequestId,
        result: Result<Vec<Section>, String>,
    },
    PreviousSection,
    NextSection,
    /// Reviewer changed the judgement of a requirement in the current section.
    RequirementMarked {
        index: usize,
        flag: RequirementFlag,
    },
    ReviewNotesChanged(String),
    ApproveClicked,
    SectionSubmitted {
        request: RequestId,
        result: Result<String, String>,
    },
    StartExtractionClicked,
    ExtractionStarted {
        request: RequestId,
        result: Result<String, String>,
    },
    /// Start watching the artifacts of the selected RFP.
    WatchArtifacts { kind: String },

    RequirementsLoaded {
        request: RequestId,
        result: Result<Vec<Requirement>, String>,
    },
    InstructionChanged(String),
    PreviousRequirement,
    NextRequirement,
    GenerateClicked,

    /// Render tick.
    Tick,
    NoOp,
}
