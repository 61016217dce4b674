//! Shared test doubles for the engine tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rfp_core::{JobRecord, Progress, Requirement, Section, SectionSubmission};
use rfp_engine::{ApiError, EngineEvent, EventSink, FailureKind, RfpApi, TextStream};

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn network_error(message: &str) -> ApiError {
    ApiError {
        kind: FailureKind::Network,
        message: message.to_string(),
    }
}

/// Answers `in_progress_rfps` and `extraction_progress` from scripts; once a script is
/// exhausted its last answer repeats. Everything else is unreachable.
#[derive(Default)]
pub struct ScriptedApi {
    jobs: Mutex<VecDeque<Result<Vec<JobRecord>, ApiError>>>,
    extraction: Mutex<VecDeque<f32>>,
    pub calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn with_jobs(script: Vec<Result<Vec<JobRecord>, ApiError>>) -> Self {
        Self {
            jobs: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn with_extraction_progress(script: Vec<f32>) -> Self {
        Self {
            extraction: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn next_or_repeat<T: Clone>(queue: &Mutex<VecDeque<T>>) -> T {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().expect("script is empty")
    }
}

#[async_trait::async_trait]
impl RfpApi for ScriptedApi {
    async fn upload(&self, _path: &Path) -> Result<String, ApiError> {
        unreachable!("upload")
    }

    async fn available_rfps(&self) -> Result<Vec<JobRecord>, ApiError> {
        unreachable!("available_rfps")
    }

    async fn in_progress_rfps(&self) -> Result<Vec<JobRecord>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next_or_repeat(&self.jobs)
    }

    async fn artifacts(&self, _rfp: &str, _kind: &str) -> Result<Vec<JobRecord>, ApiError> {
        unreachable!("artifacts")
    }

    async fn rfp_sections(&self, _rfp: &str) -> Result<Vec<Section>, ApiError> {
        unreachable!("rfp_sections")
    }

    async fn update_requirements(
        &self,
        _submission: &SectionSubmission,
    ) -> Result<String, ApiError> {
        unreachable!("update_requirements")
    }

    async fn extraction_progress(&self, _rfp: &str) -> Result<f32, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(next_or_repeat(&self.extraction))
    }

    async fn start_extraction(&self, _rfp: &str) -> Result<String, ApiError> {
        unreachable!("start_extraction")
    }

    async fn progress(&self, _rfp: &str) -> Result<Progress, ApiError> {
        unreachable!("progress")
    }

    async fn requirements(&self, _rfp: &str) -> Result<Vec<Requirement>, ApiError> {
        unreachable!("requirements")
    }

    async fn chat(&self, _rfp: &str, _message: &str) -> Result<TextStream, ApiError> {
        unreachable!("chat")
    }

    async fn respond_to_requirement(
        &self,
        _requirement: &Requirement,
        _user_message: &str,
    ) -> Result<TextStream, ApiError> {
        unreachable!("respond_to_requirement")
    }
}
