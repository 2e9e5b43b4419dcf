#![allow(dead_code)]

use async_trait::async_trait;
use media_summarizer::agent::{AnalysisRequest, AnalysisResult, ModelAgent};
use media_summarizer::error::WorkflowError;
use media_summarizer::poll::PollPolicy;
use media_summarizer::staging::{FileState, RemoteFile, StagingService};
use media_summarizer::workflow::Workflow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Staging double: reports a scripted sequence of states and records what it saw.
pub struct StubStaging {
    states: Mutex<Vec<FileState>>,
    fail_submit: bool,
    pub submitted: Mutex<Vec<(PathBuf, String, bool)>>,
    pub refreshes: Mutex<u32>,
}

impl StubStaging {
    /// The first state is returned by `submit`, the rest by successive `refresh`es.
    pub fn new(states: &[FileState]) -> Arc<Self> {
        let mut states = states.to_vec();
        states.reverse();
        Arc::new(Self {
            states: Mutex::new(states),
            fail_submit: false,
            submitted: Mutex::new(Vec::new()),
            refreshes: Mutex::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(vec![FileState::Active]),
            fail_submit: true,
            submitted: Mutex::new(Vec::new()),
            refreshes: Mutex::new(0),
        })
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn refresh_count(&self) -> u32 {
        *self.refreshes.lock().unwrap()
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.submitted.lock().unwrap()[0].0.clone()
    }

    fn next(&self) -> RemoteFile {
        let mut states = self.states.lock().unwrap();
        let state = if states.len() > 1 {
            states.pop().unwrap()
        } else {
            states[0]
        };
        RemoteFile {
            name: "files/stub".into(),
            uri: "https://example.test/v1beta/files/stub".into(),
            mime_type: "image/png".into(),
            state,
            error: None,
        }
    }
}

#[async_trait]
impl StagingService for StubStaging {
    async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        _display_name: &str,
    ) -> Result<RemoteFile, WorkflowError> {
        self.submitted
            .lock()
            .unwrap()
            .push((path.to_path_buf(), mime_type.to_string(), path.exists()));
        if self.fail_submit {
            return Err(WorkflowError::Remote("API error 500: upload rejected".into()));
        }
        Ok(self.next())
    }

    async fn refresh(&self, _name: &str) -> Result<RemoteFile, WorkflowError> {
        *self.refreshes.lock().unwrap() += 1;
        Ok(self.next())
    }
}

/// Model double: returns a fixed reply, or an error, and records every request.
pub struct StubAgent {
    reply: Result<String, String>,
    pub requests: Mutex<Vec<AnalysisRequest>>,
}

impl StubAgent {
    pub fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(content.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> AnalysisRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ModelAgent for StubAgent {
    fn model_id(&self) -> &str {
        "stub-model"
    }

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, WorkflowError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(content) => Ok(AnalysisResult {
                content: content.clone(),
                model: "stub-model".into(),
            }),
            Err(message) => Err(WorkflowError::Model(message.clone())),
        }
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        initial_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(20),
        backoff_factor: 2.0,
        max_attempts: 10,
        timeout: Duration::from_secs(5),
    }
}

pub fn workflow(staging: Arc<StubStaging>, agent: Arc<StubAgent>, scratch_dir: &Path) -> Workflow {
    Workflow::new(staging, agent, fast_poll(), scratch_dir)
}
