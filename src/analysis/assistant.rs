use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AnalysisError;

// ═══════════════════════════════════════════════════════════
// Run and message types
// ═══════════════════════════════════════════════════════════

/// Status of an assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Statuses the poll loop keeps waiting on.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::RequiresAction
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => f.write_str(code),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ThreadMessage {
    /// First non-empty text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            MessageContent::Text { text } if !text.value.is_empty() => Some(text.value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// Vision assistant API, one method per remote call (allows mocking).
pub trait AssistantClient: Send {
    fn upload_image(&self, path: &Path) -> Result<String, AnalysisError>;

    fn create_thread(&self) -> Result<String, AnalysisError>;

    /// Post a user message made of `prompt` followed by the image references.
    fn post_message(
        &self,
        thread_id: &str,
        prompt: &str,
        image_file_ids: &[String],
    ) -> Result<String, AnalysisError>;

    fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AnalysisError>;

    fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AnalysisError>;

    /// Thread messages, oldest first.
    fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AnalysisError>;
}

// ═══════════════════════════════════════════════════════════
// OpenAI Assistants v2 client
// ═══════════════════════════════════════════════════════════

const ASSISTANTS_BETA_HEADER: &str = "OpenAI-Beta";
const ASSISTANTS_BETA_VALUE: &str = "assistants=v2";

/// Blocking HTTP client for the OpenAI Assistants API.
pub struct OpenAiAssistantClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

impl OpenAiAssistantClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::ExternalService(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header(ASSISTANTS_BETA_HEADER, ASSISTANTS_BETA_VALUE)
    }

    fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<T, AnalysisError> {
        let response = self.authorized(builder).send().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::ExternalService(format!("{operation}: request timed out"))
            } else {
                AnalysisError::ExternalService(format!("{operation}: {e}"))
            }
        })?;
        parse_response(operation, response)
    }
}

fn parse_response<T: DeserializeOwned>(
    operation: &str,
    response: Response,
) -> Result<T, AnalysisError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AnalysisError::ExternalService(format!(
            "{operation} failed (status {}): {body}",
            status.as_u16()
        )));
    }
    response
        .json()
        .map_err(|e| AnalysisError::ExternalService(format!("{operation}: malformed body: {e}")))
}

impl AssistantClient for OpenAiAssistantClient {
    fn upload_image(&self, path: &Path) -> Result<String, AnalysisError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();
        let form = Form::new()
            .text("purpose", "vision")
            .part("file", Part::bytes(bytes).file_name(file_name));

        let uploaded: IdResponse =
            self.send("Image upload", self.client.post(self.url("/files")).multipart(form))?;
        Ok(uploaded.id)
    }

    fn create_thread(&self) -> Result<String, AnalysisError> {
        let thread: IdResponse = self.send(
            "Thread creation",
            self.client.post(self.url("/threads")).json(&json!({})),
        )?;
        Ok(thread.id)
    }

    fn post_message(
        &self,
        thread_id: &str,
        prompt: &str,
        image_file_ids: &[String],
    ) -> Result<String, AnalysisError> {
        let mut content = vec![json!({"type": "text", "text": prompt})];
        content.extend(image_file_ids.iter().map(|id| {
            json!({"type": "image_file", "image_file": {"file_id": id}})
        }));
        let body = json!({"role": "user", "content": content});

        let message: IdResponse = self.send(
            "Message creation",
            self.client
                .post(self.url(&format!("/threads/{thread_id}/messages")))
                .json(&body),
        )?;
        Ok(message.id)
    }

    fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AnalysisError> {
        self.send(
            "Run creation",
            self.client
                .post(self.url(&format!("/threads/{thread_id}/runs")))
                .json(&json!({"assistant_id": assistant_id})),
        )
    }

    fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AnalysisError> {
        self.send(
            "Run retrieval",
            self.client
                .get(self.url(&format!("/threads/{thread_id}/runs/{run_id}"))),
        )
    }

    fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AnalysisError> {
        let list: MessageList = self.send(
            "Message listing",
            self.client
                .get(self.url(&format!("/threads/{thread_id}/messages")))
                .query(&[("order", "asc")]),
        )?;
        Ok(list.data)
    }
}

// ═══════════════════════════════════════════════════════════
// Mock client
// ═══════════════════════════════════════════════════════════

/// Mock assistant for testing: plays back a scripted sequence of run
/// statuses, then returns a configurable reply.
pub struct MockAssistantClient {
    reply: Option<String>,
    statuses: Mutex<VecDeque<RunStatus>>,
    final_status: RunStatus,
    last_error: Option<RunError>,
    posted: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockAssistantClient {
    /// Run completes immediately with `reply` as the assistant message.
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            statuses: Mutex::new(VecDeque::new()),
            final_status: RunStatus::Completed,
            last_error: None,
            posted: Mutex::new(Vec::new()),
        }
    }

    /// Statuses returned by `create_run` and each `retrieve_run`, in order.
    /// Once exhausted the run reports `final_status`.
    pub fn with_statuses(mut self, statuses: Vec<RunStatus>, final_status: RunStatus) -> Self {
        self.statuses = Mutex::new(statuses.into());
        self.final_status = final_status;
        self
    }

    pub fn with_last_error(mut self, message: &str) -> Self {
        self.last_error = Some(RunError {
            code: Some("server_error".into()),
            message: Some(message.into()),
        });
        self
    }

    /// The assistant never answers in the thread.
    pub fn without_reply(mut self) -> Self {
        self.reply = None;
        self
    }

    /// Prompts and image ids posted so far.
    pub fn posted_messages(&self) -> Vec<(String, Vec<String>)> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_run(&self) -> Run {
        let status = self
            .statuses
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(self.final_status);
        Run {
            id: "run_mock".into(),
            status,
            last_error: self.last_error.clone(),
        }
    }
}

impl AssistantClient for MockAssistantClient {
    fn upload_image(&self, path: &Path) -> Result<String, AnalysisError> {
        std::fs::metadata(path)?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("image");
        Ok(format!("file_{name}"))
    }

    fn create_thread(&self) -> Result<String, AnalysisError> {
        Ok("thread_mock".into())
    }

    fn post_message(
        &self,
        _thread_id: &str,
        prompt: &str,
        image_file_ids: &[String],
    ) -> Result<String, AnalysisError> {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push((prompt.to_string(), image_file_ids.to_vec()));
        }
        Ok("msg_mock".into())
    }

    fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<Run, AnalysisError> {
        Ok(self.next_run())
    }

    fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run, AnalysisError> {
        Ok(self.next_run())
    }

    fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, AnalysisError> {
        let mut messages = vec![ThreadMessage {
            role: "user".into(),
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: "prompt".into(),
                },
            }],
        }];
        if let Some(reply) = &self.reply {
            messages.push(ThreadMessage {
                role: "assistant".into(),
                content: vec![MessageContent::Text {
                    text: TextContent {
                        value: reply.clone(),
                    },
                }],
            });
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_deserializes_known_and_unknown_values() {
        let run: Run = serde_json::from_str(r#"{"id": "run_1", "status": "in_progress"}"#).unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.status.is_pending());

        let run: Run =
            serde_json::from_str(r#"{"id": "run_1", "status": "something_new"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn failed_run_carries_last_error() {
        let run: Run = serde_json::from_str(
            r#"{"id": "run_1", "status": "failed", "last_error": {"code": "rate_limit_exceeded", "message": "slow down"}}"#,
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(
            run.last_error.unwrap().to_string(),
            "rate_limit_exceeded: slow down"
        );
    }

    #[test]
    fn message_first_text_skips_images() {
        let msg: ThreadMessage = serde_json::from_str(
            r#"{"role": "assistant", "content": [
                {"type": "image_file", "image_file": {"file_id": "f1"}},
                {"type": "text", "text": {"value": "hello", "annotations": []}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(msg.first_text(), Some("hello"));
    }

    #[test]
    fn pending_statuses() {
        assert!(RunStatus::Queued.is_pending());
        assert!(RunStatus::RequiresAction.is_pending());
        assert!(!RunStatus::Completed.is_pending());
        assert!(!RunStatus::Cancelling.is_pending());
    }

    #[test]
    fn openai_client_trims_trailing_slash() {
        let client = OpenAiAssistantClient::new("https://api.openai.com/v1/", "sk-test", 60).unwrap();
        assert_eq!(client.url("/threads"), "https://api.openai.com/v1/threads");
    }

    #[test]
    fn missing_upload_file_is_io_error_for_both_clients() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jpg");

        let real = OpenAiAssistantClient::new("http://127.0.0.1:9", "sk-test", 1).unwrap();
        let mock = MockAssistantClient::new("{}");
        for client in [&real as &dyn AssistantClient, &mock] {
            match client.upload_image(&missing) {
                Err(AnalysisError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
                other => panic!("expected Io, got {other:?}"),
            }
        }
    }

    #[test]
    fn mock_plays_back_statuses() {
        let mock = MockAssistantClient::new("{}")
            .with_statuses(vec![RunStatus::Queued, RunStatus::InProgress], RunStatus::Completed);
        assert_eq!(mock.create_run("t", "a").unwrap().status, RunStatus::Queued);
        assert_eq!(mock.retrieve_run("t", "r").unwrap().status, RunStatus::InProgress);
        assert_eq!(mock.retrieve_run("t", "r").unwrap().status, RunStatus::Completed);
        assert_eq!(mock.retrieve_run("t", "r").unwrap().status, RunStatus::Completed);
    }
}
