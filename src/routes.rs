use crate::agent::AnalysisResult;
use crate::error::{AppError, WorkflowError};
use crate::media::{MediaKind, UploadedMedia};
use crate::workflow::TextInput;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub title: String,
    pub content: String,
    pub model: String,
    pub processing_time_ms: u128,
}

impl AnalysisResponse {
    fn new(title: &str, result: AnalysisResult, start: Instant) -> Self {
        Self {
            title: title.to_string(),
            content: result.content,
            model: result.model,
            processing_time_ms: start.elapsed().as_millis(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// A multipart form split into its one optional file and its text fields.
#[derive(Default)]
struct Form {
    file: Option<(Option<String>, Bytes)>,
    fields: HashMap<String, String>,
}

impl Form {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Form::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                // browsers send an empty part when nothing was chosen
                if !data.is_empty() || filename.as_deref().is_some_and(|f| !f.is_empty()) {
                    form.file = Some((filename, data));
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn media(&self, kind: MediaKind) -> UploadedMedia {
        match &self.file {
            Some((filename, data)) => UploadedMedia::new(kind, data.clone(), filename.as_deref()),
            None => UploadedMedia::new(kind, Bytes::new(), None),
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.workflow.model_id().to_string(),
    })
}

pub async fn analyze_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = Instant::now();
    let form = Form::read(multipart).await?;
    let cancel = state.shutdown.child_token();

    let result = state
        .workflow
        .handle_video_request(form.media(MediaKind::Video), &form.text("query"), &cancel)
        .await
        .map_err(AppError::analysis)?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "video analysis done");
    Ok(Json(AnalysisResponse::new("Analysis Result", result, start)))
}

pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = Instant::now();
    let form = Form::read(multipart).await?;
    let cancel = state.shutdown.child_token();

    let result = state
        .workflow
        .handle_image_request(form.media(MediaKind::Image), &form.text("query"), &cancel)
        .await
        .map_err(AppError::analysis)?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "image analysis done");
    Ok(Json(AnalysisResponse::new("Analysis Result", result, start)))
}

pub async fn summarize_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = Instant::now();
    let form = Form::read(multipart).await?;

    let file = match &form.file {
        Some((filename, data)) => {
            let media = UploadedMedia::new(MediaKind::Text, data.clone(), filename.as_deref());
            if !media.has_allowed_extension() {
                return Err(AppError::summarization(WorkflowError::Validation(
                    "Only .txt files can be summarized.".to_string(),
                )));
            }
            Some(data.to_vec())
        }
        None => None,
    };

    let input = TextInput {
        typed: form.fields.get("text").cloned(),
        file,
        instructions: form.fields.get("instructions").cloned(),
    };

    let result = state
        .workflow
        .handle_text_request(input)
        .await
        .map_err(AppError::summarization)?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "text summary done");
    Ok(Json(AnalysisResponse::new("Summary Result", result, start)))
}
