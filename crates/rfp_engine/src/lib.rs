//! RFP engine: HTTP client for the RFP service and effect execution.
mod api;
mod decode;
mod engine;
mod export;
mod poller;
mod stream;
mod types;

pub use api::{ApiSettings, ReqwestApi, RfpApi};
pub use decode::{decode_text_stream, TextStream, Utf8ChunkDecoder};
pub use engine::{ChannelEventSink, EngineHandle, EngineStopped, EventSink};
pub use export::{ExportError, ResponseDocument, ResponseExporter};
pub use poller::run_poller;
pub use stream::pump_stream;
pub use types::{ApiError, EngineEvent, FailureKind, PollUpdate};
