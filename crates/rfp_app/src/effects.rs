use std::time::Duration;

use rfp_core::{Effect, Msg};
use rfp_engine::{ApiError, ApiSettings, EngineEvent, EngineHandle, EngineStopped, PollUpdate};
use rfp_logging::rfp_debug;

/// Hands effects to the engine and turns its events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            rfp_debug!("Enqueue {:?}", effect);
            self.engine.execute(effect);
        }
    }

    /// Next engine result as a message, or `None` if nothing arrived in time.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineStopped> {
        Ok(self.engine.recv_timeout(timeout)?.map(map_event))
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RfpsLoaded { request, result } => Msg::RfpsLoaded {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::Uploaded { request, result } => Msg::UploadFinished {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::Polled { request, result } => match result {
            Ok(PollUpdate::Jobs(jobs)) => Msg::JobsPolled {
                request,
                result: Ok(jobs),
            },
            Ok(PollUpdate::ExtractionProgress(percent)) => Msg::ExtractionProgressPolled {
                request,
                result: Ok(percent),
            },
            Err(err) => Msg::PollFailed {
                request,
                error: err.to_string(),
            },
        },
        EngineEvent::PollStopped { request } => Msg::PollingStopped { request },
        EngineEvent::StreamChunk { request, text } => Msg::StreamChunk { request, text },
        EngineEvent::StreamFinished { request, result } => Msg::StreamFinished {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::SectionsLoaded { request, result } => Msg::SectionsLoaded {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::SectionSubmitted { request, result } => Msg::SectionSubmitted {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::ExtractionStarted { request, result } => Msg::ExtractionStarted {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::ProgressFetched { request, result } => Msg::ProgressFetched {
            request,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::RequirementsLoaded { request, result } => Msg::RequirementsLoaded {
            request,
            result: result.map_err(|e| e.to_string()),
        },
    }
}
