use crate::error::WorkflowError;
use crate::staging::RemoteFile;
use async_trait::async_trait;

/// A staged file handed to the model alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAttachment {
    Video(RemoteFile),
    Image(RemoteFile),
}

impl MediaAttachment {
    pub fn file(&self) -> &RemoteFile {
        match self {
            MediaAttachment::Video(f) | MediaAttachment::Image(f) => f,
        }
    }
}

/// One model call: the assembled prompt and at most one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub attachment: Option<MediaAttachment>,
}

impl AnalysisRequest {
    pub fn text(prompt: String) -> Self {
        Self {
            prompt,
            attachment: None,
        }
    }

    pub fn with_attachment(prompt: String, attachment: MediaAttachment) -> Self {
        Self {
            prompt,
            attachment: Some(attachment),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub content: String,
    pub model: String,
}

/// A hosted model that answers prompts, possibly consulting its own tools first.
#[async_trait]
pub trait ModelAgent: Send + Sync {
    fn model_id(&self) -> &str;

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, WorkflowError>;
}
