use rfp_logging::rfp_debug;

use crate::state::{cancel_slot, expects, RequestIds};
use crate::{Effect, Notice, RequestId, Requirement, StreamAccumulator};

/// Response builder page: walk the confirmed requirements of one RFP and
/// stream a proposed answer for the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuilderPage {
    pub(crate) requirements: Vec<Requirement>,
    pub(crate) requirements_request: Option<RequestId>,
    pub(crate) index: usize,
    pub(crate) instruction: String,
    pub(crate) generated: StreamAccumulator,
    pub(crate) stream: Option<RequestId>,
    pub(crate) notice: Option<Notice>,
}

impl BuilderPage {
    pub(crate) fn outstanding(&self) -> impl Iterator<Item = RequestId> {
        self.requirements_request.into_iter().chain(self.stream)
    }

    pub fn is_generating(&self) -> bool {
        self.stream.is_some()
    }

    pub fn current(&self) -> Option<&Requirement> {
        self.requirements.get(self.index)
    }

    pub fn generated(&self) -> &str {
        self.generated.as_str()
    }

    pub(crate) fn select(&mut self, rfp: &str, ids: &mut RequestIds, effects: &mut Vec<Effect>) {
        cancel_slot(&mut self.requirements_request, effects);
        cancel_slot(&mut self.stream, effects);
        let instruction = std::mem::take(&mut self.instruction);
        *self = Self {
            instruction,
            ..Self::default()
        };
        let request = ids.next();
        self.requirements_request = Some(request);
        effects.push(Effect::LoadRequirements {
            request,
            rfp: rfp.to_string(),
        });
    }

    pub(crate) fn requirements_loaded(
        &mut self,
        request: RequestId,
        result: Result<Vec<Requirement>, String>,
    ) -> bool {
        if !expects(self.requirements_request, request, "requirements") {
            return false;
        }
        self.requirements_request = None;
        match result {
            Ok(requirements) => {
                self.requirements = requirements;
                self.index = 0;
                self.generated = StreamAccumulator::new();
                if self.requirements.is_empty() {
                    self.notice = Some(Notice::Info("No confirmed requirements".to_string()));
                }
            }
            Err(err) => self.notice = Some(Notice::Error(err)),
        }
        true
    }

    pub(crate) fn instruction_changed(&mut self, text: String) -> bool {
        if self.instruction == text {
            return false;
        }
        self.instruction = text;
        true
    }

    /// Moving is blocked while a response is generating.
    pub(crate) fn previous(&mut self) -> bool {
        if self.stream.is_some() || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.generated = StreamAccumulator::new();
        true
    }

    pub(crate) fn next(&mut self) -> bool {
        if self.stream.is_some() || self.index + 1 >= self.requirements.len() {
            return false;
        }
        self.index += 1;
        self.generated = StreamAccumulator::new();
        true
    }

    pub(crate) fn generate(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) -> bool {
        if self.stream.is_some() {
            return false;
        }
        let Some(requirement) = self.current().cloned() else {
            return false;
        };
        self.generated = StreamAccumulator::new();
        self.notice = None;
        let request = ids.next();
        self.stream = Some(request);
        effects.push(Effect::StreamResponse {
            request,
            requirement,
            user_message: self.instruction.trim().to_string(),
        });
        true
    }

    pub(crate) fn owns_stream(&self, request: RequestId) -> bool {
        self.stream == Some(request)
    }

    pub(crate) fn stream_chunk(&mut self, request: RequestId, text: &str) -> bool {
        if !expects(self.stream, request, "response chunk") || text.is_empty() {
            return false;
        }
        self.generated.push(text);
        true
    }

    pub(crate) fn stream_finished(&mut self, request: RequestId, result: Result<(), String>) -> bool {
        if !expects(self.stream, request, "response finish") {
            return false;
        }
        self.stream = None;
        if let Err(err) = result {
            rfp_debug!("Response stream {} ended with error: {}", request, err);
            self.notice = Some(Notice::Error(format!("Generation failed: {err}")));
        }
        true
    }
}
