//! Drives one user request from raw input to model output.

use crate::agent::{AnalysisRequest, AnalysisResult, MediaAttachment, ModelAgent};
use crate::error::WorkflowError;
use crate::media::{MediaKind, ScratchFile, UploadedMedia};
use crate::poll::{wait_until_ready, PollPolicy};
use crate::prompt;
use crate::staging::StagingService;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Text typed into the form and/or a `.txt` upload. The file wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub typed: Option<String>,
    pub file: Option<Vec<u8>>,
    pub instructions: Option<String>,
}

impl TextInput {
    pub fn resolve(&self) -> Result<String, WorkflowError> {
        match &self.file {
            Some(bytes) => String::from_utf8(bytes.clone()).map_err(|_| {
                WorkflowError::Validation("The uploaded text file is not valid UTF-8.".to_string())
            }),
            None => Ok(self.typed.clone().unwrap_or_default()),
        }
    }
}

pub struct Workflow {
    staging: Arc<dyn StagingService>,
    agent: Arc<dyn ModelAgent>,
    poll: PollPolicy,
    scratch_dir: PathBuf,
}

impl Workflow {
    pub fn new(
        staging: Arc<dyn StagingService>,
        agent: Arc<dyn ModelAgent>,
        poll: PollPolicy,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            staging,
            agent,
            poll,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        self.agent.model_id()
    }

    pub async fn handle_video_request(
        &self,
        media: UploadedMedia,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, WorkflowError> {
        self.handle_media_request(MediaKind::Video, media, query, cancel).await
    }

    pub async fn handle_image_request(
        &self,
        media: UploadedMedia,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, WorkflowError> {
        self.handle_media_request(MediaKind::Image, media, query, cancel).await
    }

    pub async fn handle_text_request(&self, input: TextInput) -> Result<AnalysisResult, WorkflowError> {
        let text = input.resolve()?;
        if text.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Please provide some text or upload a file to summarize.".to_string(),
            ));
        }

        info!(chars = text.len(), "summarizing text");
        let prompt = prompt::text_prompt(&text, input.instructions.as_deref());
        self.agent.run(AnalysisRequest::text(prompt)).await
    }

    async fn handle_media_request(
        &self,
        expected: MediaKind,
        media: UploadedMedia,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, WorkflowError> {
        validate(&media, expected, query)?;

        let scratch = ScratchFile::create(&self.scratch_dir, &media).await?;
        info!(
            kind = media.kind.label(),
            bytes = media.bytes.len(),
            scratch = %scratch.path().display(),
            "staging upload"
        );

        let outcome = self.analyze(&scratch, &media, query, cancel).await;

        if let Err(e) = scratch.close() {
            warn!(error = %e, "could not remove scratch file");
        }
        outcome
    }

    async fn analyze(
        &self,
        scratch: &ScratchFile,
        media: &UploadedMedia,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, WorkflowError> {
        let display_name = media.display_name();
        let submitted = tokio::select! {
            _ = cancel.cancelled() => return Err(WorkflowError::Cancelled),
            res = self.staging.submit(scratch.path(), media.mime_type(), &display_name) => res?,
        };
        let ready = wait_until_ready(self.staging.as_ref(), submitted, &self.poll, cancel).await?;

        let request = match media.kind {
            MediaKind::Video => {
                AnalysisRequest::with_attachment(prompt::video_prompt(query), MediaAttachment::Video(ready))
            }
            MediaKind::Image => {
                AnalysisRequest::with_attachment(prompt::image_prompt(query), MediaAttachment::Image(ready))
            }
            MediaKind::Text => {
                return Err(WorkflowError::Validation(
                    "Text uploads belong in the summarization form.".to_string(),
                ))
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(WorkflowError::Cancelled),
            res = self.agent.run(request) => res,
        }
    }
}

fn article(kind: MediaKind) -> &'static str {
    if kind == MediaKind::Image {
        "an"
    } else {
        "a"
    }
}

fn validate(media: &UploadedMedia, expected: MediaKind, query: &str) -> Result<(), WorkflowError> {
    let label = media.kind.label();
    if media.kind == MediaKind::Text {
        return Err(WorkflowError::Validation(
            "Text uploads belong in the summarization form.".to_string(),
        ));
    }
    if media.kind != expected {
        return Err(WorkflowError::Validation(format!(
            "Expected {} {} file but got {} {label} file.",
            article(expected),
            expected.label(),
            article(media.kind),
        )));
    }
    if media.bytes.is_empty() {
        return Err(WorkflowError::Validation(format!(
            "Upload {} {label} file to begin analysis.",
            article(media.kind)
        )));
    }
    if !media.has_allowed_extension() {
        return Err(WorkflowError::Validation(format!(
            "Unsupported {label} type; use one of: {}.",
            media.kind.allowed_extensions().join(", ")
        )));
    }
    if query.trim().is_empty() {
        return Err(WorkflowError::Validation(format!(
            "Please enter a question or insight to analyze the {label}."
        )));
    }
    Ok(())
}
