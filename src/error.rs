use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Startup configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or GOOGLE_API_KEY) must be set in the environment or .env file")]
    MissingApiKey,

    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
}

/// Everything that can go wrong while serving one analysis request.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Bad or missing user input. Shown as a warning; nothing was sent anywhere.
    #[error("{0}")]
    Validation(String),

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote service error: {0}")]
    Remote(String),

    #[error("remote processing of {name} failed: {message}")]
    StagingFailed { name: String, message: String },

    #[error("{name} still processing after {attempts} polls ({elapsed:?})")]
    PollTimeout {
        name: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("model error: {0}")]
    Model(String),

    #[error("web search failed: {0}")]
    Search(String),
}

/// Request URLs are dropped so nothing sensitive in them reaches logs or users.
impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        WorkflowError::Remote(err.without_url().to_string())
    }
}

/// Which user action failed, so the message reads like the page that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Analysis,
    Summarization,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{source}")]
    Workflow {
        action: Action,
        #[source]
        source: WorkflowError,
    },

    #[error("malformed form data: {0}")]
    Multipart(#[from] MultipartError),
}

impl AppError {
    pub fn analysis(source: WorkflowError) -> Self {
        AppError::Workflow {
            action: Action::Analysis,
            source,
        }
    }

    pub fn summarization(source: WorkflowError) -> Self {
        AppError::Workflow {
            action: Action::Summarization,
            source,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Workflow {
                source: WorkflowError::Validation(msg),
                ..
            } => (StatusCode::UNPROCESSABLE_ENTITY, "warning", msg),
            AppError::Workflow { action, source } => {
                tracing::error!(error = %source, "request failed");
                let status = match source {
                    WorkflowError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    WorkflowError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                    WorkflowError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_GATEWAY,
                };
                let noun = match action {
                    Action::Analysis => "analysis",
                    Action::Summarization => "summarization",
                };
                (
                    status,
                    "error",
                    format!("An error occurred during {noun}: {source}"),
                )
            }
            AppError::Multipart(e) => (e.status(), "error", e.body_text()),
        };

        (status, Json(ErrorBody { kind, message })).into_response()
    }
}
