use rfp_logging::rfp_debug;

use crate::state::{cancel_slot, expects, RequestIds};
use crate::{Effect, Notice, RequestId, Role, StreamAccumulator, Transcript};

/// Chat page: one transcript per selected RFP, one streamed answer at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalyzerPage {
    pub(crate) rfp: Option<String>,
    pub(crate) input: String,
    pub(crate) transcript: Transcript,
    pub(crate) stream: Option<RequestId>,
    pub(crate) answer: StreamAccumulator,
    pub(crate) notice: Option<Notice>,
}

impl AnalyzerPage {
    pub(crate) fn outstanding(&self) -> impl Iterator<Item = RequestId> {
        self.stream.into_iter()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub(crate) fn select(&mut self, rfp: &str, effects: &mut Vec<Effect>) {
        cancel_slot(&mut self.stream, effects);
        self.rfp = Some(rfp.to_string());
        self.answer = StreamAccumulator::new();
        self.transcript = Transcript::new();
        self.transcript
            .push(Role::System, format!("Initial analysis for RFP {rfp}"));
        self.notice = None;
    }

    pub(crate) fn input_changed(&mut self, text: String) -> bool {
        if self.input == text {
            return false;
        }
        self.input = text;
        true
    }

    /// Send the typed message. Blank input, no RFP, or an answer still
    /// streaming makes this a no-op.
    pub(crate) fn submit(&mut self, ids: &mut RequestIds, effects: &mut Vec<Effect>) -> bool {
        let message = self.input.trim().to_string();
        if message.is_empty() || self.stream.is_some() {
            return false;
        }
        let Some(rfp) = self.rfp.clone() else {
            self.notice = Some(Notice::Error("Select an RFP first".to_string()));
            return true;
        };
        self.transcript.push(Role::User, message.clone());
        self.input.clear();
        self.answer = StreamAccumulator::new();
        self.notice = None;

        let request = ids.next();
        self.stream = Some(request);
        effects.push(Effect::StreamChat {
            request,
            rfp,
            message,
        });
        true
    }

    pub(crate) fn owns_stream(&self, request: RequestId) -> bool {
        self.stream == Some(request)
    }

    pub(crate) fn stream_chunk(&mut self, request: RequestId, text: &str) -> bool {
        if !expects(self.stream, request, "chat chunk") || text.is_empty() {
            return false;
        }
        let so_far = self.answer.push(text);
        self.transcript.upsert_last(Role::Assistant, so_far);
        true
    }

    pub(crate) fn stream_finished(&mut self, request: RequestId, result: Result<(), String>) -> bool {
        if !expects(self.stream, request, "chat finish") {
            return false;
        }
        self.stream = None;
        if let Err(err) = result {
            rfp_debug!("Chat stream {} ended with error: {}", request, err);
            self.transcript.push(Role::System, format!("Error: {err}"));
        }
        true
    }
}
