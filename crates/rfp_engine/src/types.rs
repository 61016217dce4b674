use std::fmt;

use rfp_core::{JobRecord, Progress, RequestId, Requirement, Section};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "cancelled")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            // The server's own `{error}` text is what users should read.
            FailureKind::HttpStatus(_) => f.write_str(&self.message),
            kind => write!(f, "{kind}: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Response body was not the JSON shape we expected.
    Decode,
    /// The body stream broke off mid-read.
    Stream,
    /// Local file could not be read.
    Io,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::Stream => write!(f, "stream aborted"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One successful poll tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PollUpdate {
    Jobs(Vec<JobRecord>),
    /// Extraction job percentage.
    ExtractionProgress(f32),
}

impl PollUpdate {
    /// Whether the poller should run another tick after this one.
    pub fn keeps_polling(&self) -> bool {
        match self {
            PollUpdate::Jobs(batch) => rfp_core::keeps_polling(batch),
            PollUpdate::ExtractionProgress(percent) => *percent < 100.0,
        }
    }
}

/// Results reported by the engine, each tagged with the originating request.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RfpsLoaded {
        request: RequestId,
        result: Result<Vec<JobRecord>, ApiError>,
    },
    Uploaded {
        request: RequestId,
        result: Result<String, ApiError>,
    },
    Polled {
        request: RequestId,
        result: Result<PollUpdate, ApiError>,
    },
    /// Always sent once when a poller exits, however it exits.
    PollStopped { request: RequestId },
    StreamChunk { request: RequestId, text: String },
    /// Always sent once when a stream task exits, however it exits.
    StreamFinished {
        request: RequestId,
        result: Result<(), ApiError>,
    },
    SectionsLoaded {
        request: RequestId,
        result: Result<Vec<Section>, ApiError>,
    },
    SectionSubmitted {
        request: RequestId,
        result: Result<String, ApiError>,
    },
    ExtractionStarted {
        request: RequestId,
        result: Result<String, ApiError>,
    },
    ProgressFetched {
        request: RequestId,
        result: Result<Progress, ApiError>,
    },
    RequirementsLoaded {
        request: RequestId,
        result: Result<Vec<Requirement>, ApiError>,
    },
}
