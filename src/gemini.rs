//! Google Gemini: the Files API for staging and `generateContent` for the agent.

use crate::agent::{AnalysisRequest, AnalysisResult, ModelAgent};
use crate::error::WorkflowError;
use crate::search::SearchTool;
use crate::staging::{RemoteFile, StagingService};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const AGENT_NAME: &str = "Media AI Summarizer";
const SEARCH_FUNCTION: &str = "duckduckgo_search";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin HTTP client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn generate(&self, model: &str, payload: &Value) -> Result<GenerateResponse, WorkflowError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        debug!(model, "sending request to Gemini");

        let resp = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await?;
        let body = checked_body(resp).await?;
        serde_json::from_str(&body).map_err(|e| WorkflowError::Model(format!("unreadable response: {e}")))
    }
}

/// Turn a non-2xx reply into an error carrying the API's own message.
async fn checked_body(resp: Response) -> Result<String, WorkflowError> {
    let status = resp.status();
    let text = resp.text().await?;
    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.chars().take(500).collect());
    Err(WorkflowError::Remote(format!("API error {status}: {message}")))
}

#[derive(Deserialize)]
struct FileEnvelope {
    file: RemoteFile,
}

#[async_trait]
impl StagingService for GeminiClient {
    async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, WorkflowError> {
        let bytes = tokio::fs::read(path).await?;
        let len = bytes.len().to_string();

        // Resumable protocol: open a session, then send everything in one go.
        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", &len)
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;

        let status = start.status();
        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let upload_url = match upload_url {
            Some(url) if status.is_success() => url,
            _ => {
                checked_body(start).await?;
                return Err(WorkflowError::Remote(
                    "upload session missing x-goog-upload-url".to_string(),
                ));
            }
        };

        let resp = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;
        let body = checked_body(resp).await?;
        let envelope: FileEnvelope = serde_json::from_str(&body)
            .map_err(|e| WorkflowError::Remote(format!("unreadable upload response: {e}")))?;

        info!(file = %envelope.file.name, state = ?envelope.file.state, size = %len, "uploaded file");
        Ok(envelope.file)
    }

    async fn refresh(&self, name: &str) -> Result<RemoteFile, WorkflowError> {
        let resp = self
            .http
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body = checked_body(resp).await?;
        serde_json::from_str(&body)
            .map_err(|e| WorkflowError::Remote(format!("unreadable file resource: {e}")))
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    /// Kept raw so it can be echoed back verbatim on tool turns.
    content: Value,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl Candidate {
    fn parts(&self) -> Vec<Part> {
        self.content
            .get("parts")
            .cloned()
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default()
    }
}

/// The configured model plus its optional web-search tool.
pub struct GeminiAgent {
    client: GeminiClient,
    model: String,
    search: Option<Arc<dyn SearchTool>>,
    search_max_results: usize,
    max_tool_rounds: u32,
}

impl GeminiAgent {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            search: None,
            search_max_results: 5,
            max_tool_rounds: 4,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchTool>, max_results: usize) -> Self {
        self.search = Some(search);
        self.search_max_results = max_results;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    fn payload(&self, contents: &[Value]) -> Value {
        let mut payload = json!({
            "system_instruction": {
                "parts": [{
                    "text": format!(
                        "You are {AGENT_NAME}. Use markdown to format your answers."
                    )
                }]
            },
            "contents": contents,
        });
        if self.search.is_some() {
            payload["tools"] = json!([{
                "function_declarations": [{
                    "name": SEARCH_FUNCTION,
                    "description": "Search the web with DuckDuckGo and return result titles, URLs and snippets.",
                    "parameters": {
                        "type": "OBJECT",
                        "properties": {
                            "query": { "type": "STRING", "description": "The search query." },
                            "max_results": { "type": "INTEGER", "description": "How many results to return." }
                        },
                        "required": ["query"]
                    }
                }]
            }]);
        }
        payload
    }

    /// Run one function call. Failures go back to the model as data.
    async fn call_tool(&self, call: &FunctionCall) -> Value {
        let search = match (&self.search, call.name.as_str()) {
            (Some(search), SEARCH_FUNCTION) => search,
            _ => {
                warn!(function = %call.name, "model called an unknown function");
                return json!({ "error": format!("unknown function {}", call.name) });
            }
        };

        let Some(query) = call.args.get("query").and_then(Value::as_str) else {
            return json!({ "error": "missing required argument: query" });
        };
        let max_results = call
            .args
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| (n as usize).min(self.search_max_results))
            .unwrap_or(self.search_max_results);

        info!(query, "model requested web search");
        match search.search(query, max_results).await {
            Ok(hits) => json!({ "results": hits }),
            Err(e) => {
                warn!(error = %e, "web search failed");
                json!({ "error": e.to_string() })
            }
        }
    }
}

#[async_trait]
impl ModelAgent for GeminiAgent {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, WorkflowError> {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(attachment) = &request.attachment {
            let file = attachment.file();
            parts.push(json!({
                "file_data": { "mime_type": file.mime_type, "file_uri": file.uri }
            }));
        }
        let mut contents = vec![json!({ "role": "user", "parts": parts })];

        for round in 0..=self.max_tool_rounds {
            let resp = self.client.generate(&self.model, &self.payload(&contents)).await?;

            let Some(candidate) = resp.candidates.into_iter().next() else {
                let reason = resp
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(WorkflowError::Model(format!("response blocked: {reason}")));
            };

            let parts = candidate.parts();
            let calls: Vec<&FunctionCall> =
                parts.iter().filter_map(|p| p.function_call.as_ref()).collect();

            if calls.is_empty() {
                let content: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
                if content.trim().is_empty() {
                    return Err(WorkflowError::Model(format!(
                        "empty response (finish reason: {})",
                        candidate.finish_reason.as_deref().unwrap_or("unknown")
                    )));
                }
                info!(model = %self.model, tool_rounds = round, chars = content.len(), "model answered");
                return Ok(AnalysisResult {
                    content,
                    model: self.model.clone(),
                });
            }

            if round == self.max_tool_rounds {
                break;
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                let response = self.call_tool(call).await;
                responses.push(json!({
                    "functionResponse": { "name": call.name, "response": response }
                }));
            }
            contents.push(candidate.content.clone());
            contents.push(json!({ "role": "user", "parts": responses }));
        }

        Err(WorkflowError::Model(format!(
            "model kept calling tools after {} rounds",
            self.max_tool_rounds
        )))
    }
}
