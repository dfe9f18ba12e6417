//! Task extraction from an assembled transcript.
//!
//! One chat-completion request per recording turns the transcript into a
//! structured Markdown report. Section compliance is best-effort; the
//! model's response is persisted verbatim.

mod openai_chat;

pub use openai_chat::ChatClient;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::retry::RetryPolicy;

const SYSTEM_PROMPT: &str = "You are an assistant specialized in analyzing meetings and \
producing structured documents. Always respond with clear, professional formatting.";

const TASK_PROMPT: &str = "Analyze this meeting transcript and produce a structured document with:

1. **EXECUTIVE SUMMARY** (2-3 sentences)
2. **PARTICIPANTS** (if identifiable)
3. **KEY POINTS DISCUSSED** (bullet list)
4. **DECISIONS MADE** (each decision with its context)
5. **ACTION ITEMS / TO-DO LIST** (format: \"- [ ] Action (Owner, Deadline if mentioned)\")
6. **NEXT STEPS** (what happens next)
7. **ADDITIONAL NOTES** (important information not covered above)

Use clean, professional Markdown. If a section cannot be identified, write \"Not specified\".

TRANSCRIPT:
";

/// Structured summary and action-item report for one transcript.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub markdown: String,
}

pub struct TaskExtractor {
    client: ChatClient,
    model: String,
    policy: RetryPolicy,
}

impl TaskExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            client: ChatClient::new(config),
            model: config.chat_model.clone(),
            policy: config.retry_policy(),
        }
    }

    /// Ask the chat model for the task report.
    pub async fn extract(&self, transcript_text: &str) -> Result<TaskReport> {
        info!("generating summary and tasks with model {}", self.model);

        let prompt = format!("{}{}", TASK_PROMPT, transcript_text);
        let client = &self.client;
        let model = self.model.as_str();
        let prompt = prompt.as_str();

        let markdown = self
            .policy
            .run("task extraction", move || {
                client.complete(model, SYSTEM_PROMPT, prompt)
            })
            .await?;

        info!("summary and tasks generated ({} chars)", markdown.len());
        Ok(TaskReport { markdown })
    }
}
