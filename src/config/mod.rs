//! Runtime configuration.
//!
//! Everything is read from the environment exactly once at startup and
//! carried in an explicit [`Config`] value; components never consult the
//! environment themselves.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_MAX_PARALLEL_TASKS: usize = 3;
const DEFAULT_SIZE_LIMIT_MB: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for both the transcription and chat-completion services.
    pub api_key: String,
    pub org_id: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub api_base_url: String,
    /// Transcription model id.
    pub whisper_model: String,
    /// Summarization model id.
    pub chat_model: String,
    /// Maximum attempts per external API call.
    pub max_retries: u32,
    /// Upper bound on concurrent transcription requests.
    pub max_parallel_tasks: usize,
    /// Recordings larger than this are split before upload.
    pub size_limit_mb: u64,
    /// Where transcript and task artifacts are written.
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = match var("OPENAI_API_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!("OPENAI_API_KEY is not set. Export your OpenAI API key before running."),
        };

        let max_retries: u32 = parse_var(&var, "MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            bail!("MAX_RETRIES must be at least 1");
        }

        let max_parallel_tasks: usize =
            parse_var(&var, "MAX_PARALLEL_TASKS", DEFAULT_MAX_PARALLEL_TASKS)?;
        if max_parallel_tasks == 0 {
            bail!("MAX_PARALLEL_TASKS must be at least 1");
        }

        Ok(Self {
            api_key,
            org_id: var("OPENAI_ORG_ID").filter(|v| !v.trim().is_empty()),
            api_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            whisper_model: var("WHISPER_MODEL")
                .unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
            chat_model: var("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            max_retries,
            max_parallel_tasks,
            size_limit_mb: parse_var(&var, "SIZE_LIMIT_MB", DEFAULT_SIZE_LIMIT_MB)?,
            output_dir: PathBuf::from("output"),
        })
    }

    pub fn size_limit_bytes(&self) -> u64 {
        self.size_limit_mb * 1024 * 1024
    }

    /// Backoff policy shared by the transcription and summarization clients:
    /// 2s base delay doubling per attempt, capped at 60s.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_secs(2),
            Duration::from_secs(60),
        )
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
