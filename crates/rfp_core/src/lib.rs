//! RFP workbench core: pure page state machines and view-model helpers.
//!
//! Nothing in here performs I/O. [`update`] turns a [`Msg`] into a new
//! [`AppState`] plus the [`Effect`]s a runtime must execute; the runtime
//! reports results back as further messages tagged with the effect's
//! [`RequestId`].
mod chat;
mod effect;
mod jobs;
mod model;
mod msg;
mod pages;
mod review;
mod state;
mod update;
mod view_model;

pub use chat::{StreamAccumulator, Transcript};
pub use effect::{Effect, PollTarget};
pub use jobs::{keeps_polling, JobList};
pub use model::{
    ChatMessage, JobRecord, JobStatus, Progress, RequestId, Requirement, RequirementFlag,
    RequirementJudgements, Role, Section, SectionSubmission,
};
pub use msg::Msg;
pub use pages::{AnalyzerPage, BuilderPage, ExtractionPage, UploadPage};
pub use review::{ApproveOutcome, SectionReview};
pub use state::{AppState, Notice, Page, RequestIds};
pub use update::update;
pub use view_model::{AnalyzerView, AppViewModel, BuilderView, ExtractionView, UploadView};
