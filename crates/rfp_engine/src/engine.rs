use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rfp_core::{Effect, RequestId};
use rfp_logging::{rfp_debug, rfp_error, rfp_info};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::poller::run_poller;
use crate::stream::pump_stream;
use crate::{ApiError, ApiSettings, EngineEvent, ReqwestApi, RfpApi};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The worker thread is gone, so no further events will arrive.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("engine worker has stopped")]
pub struct EngineStopped;

enum EngineCommand {
    Execute(Effect),
    Shutdown,
}

/// Runs effects on a dedicated tokio runtime thread and hands results back
/// through a channel the UI thread drains.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApi::new(settings)?);
        Ok(Self::with_api(api, settings.poll_interval))
    }

    pub fn with_api(api: Arc<dyn RfpApi>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    rfp_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            let root = CancellationToken::new();
            let mut tasks: HashMap<RequestId, CancellationToken> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                // Finished tasks cancel their own token on exit.
                tasks.retain(|_, token| !token.is_cancelled());
                match command {
                    EngineCommand::Execute(Effect::Cancel { request }) => {
                        if let Some(token) = tasks.remove(&request) {
                            rfp_debug!("Cancelling request {}", request);
                            token.cancel();
                        }
                    }
                    EngineCommand::Execute(effect) => {
                        let request = effect.request();
                        rfp_info!("Execute request={} {}", request, describe(&effect));
                        let token = root.child_token();
                        tasks.insert(request, token.clone());
                        let api = api.clone();
                        let sink = ChannelEventSink::new(event_tx.clone());
                        runtime.spawn(async move {
                            let _guard = token.clone().drop_guard();
                            execute(api.as_ref(), effect, token, poll_interval, &sink).await;
                        });
                    }
                    EngineCommand::Shutdown => break,
                }
            }

            root.cancel();
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        }
    }

    pub fn execute(&self, effect: Effect) {
        let _ = self.cmd_tx.send(EngineCommand::Execute(effect));
    }

    pub fn execute_all(&self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Ask the worker to cancel everything and exit.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    /// Wait up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

async fn execute(
    api: &dyn RfpApi,
    effect: Effect,
    token: CancellationToken,
    poll_interval: Duration,
    sink: &dyn EventSink,
) {
    match effect {
        Effect::StartPolling { request, target } => {
            run_poller(api, request, target, poll_interval, token, sink).await;
        }
        Effect::StreamChat {
            request,
            rfp,
            message,
        } => {
            pump_stream(api.chat(&rfp, &message), request, token, sink).await;
        }
        Effect::StreamResponse {
            request,
            requirement,
            user_message,
        } => {
            let open = api.respond_to_requirement(&requirement, &user_message);
            pump_stream(open, request, token, sink).await;
        }
        one_shot => {
            // Nobody is waiting for a cancelled one-shot, so report nothing.
            let request = one_shot.request();
            tokio::select! {
                _ = token.cancelled() => {
                    rfp_debug!("Request {} cancelled before completion", request);
                }
                event = run_one_shot(api, one_shot) => {
                    if let Some(event) = event {
                        sink.emit(event);
                    }
                }
            }
        }
    }
}

async fn run_one_shot(api: &dyn RfpApi, effect: Effect) -> Option<EngineEvent> {
    let event = match effect {
        Effect::LoadRfps { request } => EngineEvent::RfpsLoaded {
            request,
            result: api.available_rfps().await,
        },
        Effect::Upload { request, path } => EngineEvent::Uploaded {
            request,
            result: api.upload(&PathBuf::from(path)).await,
        },
        Effect::LoadSections { request, rfp } => EngineEvent::SectionsLoaded {
            request,
            result: api.rfp_sections(&rfp).await,
        },
        Effect::SubmitSection {
            request,
            submission,
        } => EngineEvent::SectionSubmitted {
            request,
            result: api.update_requirements(&submission).await,
        },
        Effect::StartExtraction { request, rfp } => EngineEvent::ExtractionStarted {
            request,
            result: api.start_extraction(&rfp).await,
        },
        Effect::FetchProgress { request, rfp } => EngineEvent::ProgressFetched {
            request,
            result: api.progress(&rfp).await,
        },
        Effect::LoadRequirements { request, rfp } => EngineEvent::RequirementsLoaded {
            request,
            result: api.requirements(&rfp).await,
        },
        Effect::Cancel { .. }
        | Effect::StartPolling { .. }
        | Effect::StreamChat { .. }
        | Effect::StreamResponse { .. } => return None,
    };
    Some(event)
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::LoadRfps { .. } => "load-rfps".to_string(),
        Effect::Upload { path, .. } => format!("upload path={path}"),
        Effect::StartPolling { target, .. } => format!("poll target={target:?}"),
        Effect::Cancel { .. } => "cancel".to_string(),
        Effect::StreamChat { rfp, message, .. } => {
            format!("chat rfp={rfp} message_len={}", message.len())
        }
        Effect::LoadSections { rfp, .. } => format!("sections rfp={rfp}"),
        Effect::SubmitSection { submission, .. } => format!(
            "submit rfp={} section={} requirements={}",
            submission.rfp_name,
            submission.section_id,
            submission.requirements.output.len()
        ),
        Effect::StartExtraction { rfp, .. } => format!("start-extraction rfp={rfp}"),
        Effect::FetchProgress { rfp, .. } => format!("progress rfp={rfp}"),
        Effect::LoadRequirements { rfp, .. } => format!("requirements rfp={rfp}"),
        Effect::StreamResponse { requirement, .. } => format!(
            "respond section={} content_len={}",
            requirement.section_number,
            requirement.content.len()
        ),
    }
}
