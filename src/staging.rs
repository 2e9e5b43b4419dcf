//! Remote file staging: the service that receives uploads and preprocesses
//! them before the model can use them.

use crate::error::WorkflowError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(rename = "STATE_UNSPECIFIED", other)]
    Unspecified,
}

/// Handle to a file owned by the staging service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`.
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default = "unspecified")]
    pub state: FileState,
    #[serde(default)]
    pub error: Option<RemoteStatus>,
}

fn unspecified() -> FileState {
    FileState::Unspecified
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteStatus {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RemoteFile {
    pub fn failure_message(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "no reason given".to_string())
    }
}

#[async_trait]
pub trait StagingService: Send + Sync {
    /// Upload a local file and return its handle, usually still processing.
    async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, WorkflowError>;

    /// Fetch the current state of a previously submitted file.
    async fn refresh(&self, name: &str) -> Result<RemoteFile, WorkflowError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_resource() {
        let file: RemoteFile = serde_json::from_str(
            r#"{
                "name": "files/abc123",
                "displayName": "upload.mp4",
                "mimeType": "video/mp4",
                "sizeBytes": "1024",
                "uri": "https://example.test/v1beta/files/abc123",
                "state": "PROCESSING"
            }"#,
        )
        .unwrap();
        assert_eq!(file.name, "files/abc123");
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.state, FileState::Processing);
        assert!(file.error.is_none());
    }

    #[test]
    fn unknown_or_missing_state_is_unspecified() {
        let file: RemoteFile =
            serde_json::from_str(r#"{"name": "files/x", "state": "ARCHIVED"}"#).unwrap();
        assert_eq!(file.state, FileState::Unspecified);

        let file: RemoteFile = serde_json::from_str(r#"{"name": "files/x"}"#).unwrap();
        assert_eq!(file.state, FileState::Unspecified);
    }

    #[test]
    fn failure_message_falls_back() {
        let file: RemoteFile = serde_json::from_str(
            r#"{"name": "files/x", "state": "FAILED", "error": {"code": 3, "message": "bad codec"}}"#,
        )
        .unwrap();
        assert_eq!(file.failure_message(), "bad codec");

        let bare: RemoteFile =
            serde_json::from_str(r#"{"name": "files/x", "state": "FAILED"}"#).unwrap();
        assert_eq!(bare.failure_message(), "no reason given");
    }
}
