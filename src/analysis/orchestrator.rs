use std::path::Path;
use std::time::{Duration, Instant};

use super::assistant::{AssistantClient, RunStatus};
use super::prompt::build_analysis_prompt;
use super::AnalysisError;

/// Poll interval and upper bound for waiting on an assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    /// 1 second between polls, 5 minutes at most.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(300),
        }
    }
}

/// Send both images and the fixed prompt to the assistant and return its raw
/// text reply.
///
/// No step is retried: the first failure aborts the whole analysis.
pub fn analyze_images(
    client: &dyn AssistantClient,
    assistant_id: &str,
    before_path: &Path,
    after_path: &Path,
    procedures: &[String],
    policy: PollPolicy,
) -> Result<String, AnalysisError> {
    let _span = tracing::info_span!(
        "assistant_analysis",
        assistant_id,
        procedures = procedures.len(),
    )
    .entered();
    let start = Instant::now();

    let prompt = build_analysis_prompt(procedures);

    let before_id = client.upload_image(before_path)?;
    let after_id = client.upload_image(after_path)?;
    tracing::debug!(%before_id, %after_id, "Images uploaded");

    let thread_id = client.create_thread()?;
    client.post_message(&thread_id, &prompt, &[before_id, after_id])?;

    let mut run = client.create_run(&thread_id, assistant_id)?;
    tracing::debug!(%thread_id, run_id = %run.id, status = %run.status, "Run created");

    let poll_start = Instant::now();
    while run.status.is_pending() {
        if poll_start.elapsed() > policy.max_wait {
            tracing::warn!(
                run_id = %run.id,
                waited_secs = poll_start.elapsed().as_secs(),
                "Assistant run timed out"
            );
            return Err(AnalysisError::Timeout {
                waited_secs: policy.max_wait.as_secs(),
            });
        }

        std::thread::sleep(policy.interval);
        run = client.retrieve_run(&thread_id, &run.id)?;

        match run.status {
            RunStatus::Failed => {
                let reason = run
                    .last_error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown error".into());
                return Err(AnalysisError::ExternalService(format!("Run failed: {reason}")));
            }
            RunStatus::Cancelled => {
                return Err(AnalysisError::ExternalService("Run was cancelled".into()));
            }
            _ => {}
        }
    }

    if run.status != RunStatus::Completed {
        return Err(AnalysisError::ExternalService(format!(
            "Run ended with unexpected status: {}",
            run.status
        )));
    }

    let messages = client.list_messages(&thread_id)?;
    let reply = messages
        .iter()
        .rev()
        .filter(|m| m.role == "assistant")
        .find_map(|m| m.first_text())
        .ok_or_else(|| {
            AnalysisError::ExternalService("No reply found from the assistant".into())
        })?;

    tracing::info!(
        elapsed_ms = %start.elapsed().as_millis(),
        reply_len = reply.len(),
        "Assistant analysis complete"
    );

    Ok(reply.to_string())
}
