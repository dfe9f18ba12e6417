//! OpenAI-compatible speech-to-text provider.
//!
//! Uploads audio as multipart form data to the `audio/transcriptions`
//! endpoint, requesting `verbose_json` so per-segment timestamps come back
//! when the service supports them.

use anyhow::{anyhow, Context};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio::fs;
use tracing::{debug, info};

use super::{mime_type_for_extension, ChunkTranscription, TranscriptionProvider};
use crate::config::Config;
use crate::retry::ApiCallError;
use crate::transcript::TranscriptEntry;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    segments: Option<Vec<ApiSegment>>,
}

#[derive(Debug, Deserialize)]
struct ApiSegment {
    start: f64,
    #[allow(dead_code)]
    end: f64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub struct OpenAiWhisperProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    org_id: Option<String>,
    model: String,
}

impl OpenAiWhisperProvider {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "{}/audio/transcriptions",
            config.api_base_url.trim_end_matches('/')
        );
        info!("initialized transcription provider with endpoint {}", endpoint);

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
            org_id: config.org_id.clone(),
            model: config.whisper_model.clone(),
        }
    }

    async fn request(&self, audio_path: &Path) -> Result<ChunkTranscription, ApiCallError> {
        let file_data = fs::read(audio_path)
            .await
            .with_context(|| format!("failed to read {}", audio_path.display()))
            .map_err(ApiCallError::Permanent)?;

        let filename = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let ext = audio_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let mime = mime_type_for_extension(&ext).unwrap_or("application/octet-stream");

        let part = Part::bytes(file_data)
            .file_name(filename)
            .mime_str(mime)
            .context("invalid mime type")
            .map_err(ApiCallError::Permanent)?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        debug!("uploading {} for transcription", audio_path.display());

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form);
        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(|e| {
            ApiCallError::Transient(anyhow!(e).context("transcription request failed"))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiCallError::Transient(anyhow!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => format!(
                    "{} (type: {:?})",
                    parsed.error.message, parsed.error.kind
                ),
                Err(_) => body,
            };
            return Err(ApiCallError::from_status(
                status,
                anyhow!("transcription request failed with status {}: {}", status, message),
            ));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .context("failed to parse transcription response")
            .map_err(ApiCallError::Permanent)?;

        let entries = parsed
            .segments
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| TranscriptEntry {
                timestamp: s.start,
                text: s.text.trim().to_string(),
            })
            .collect();

        debug!(
            "transcribed {} chars from {}",
            parsed.text.len(),
            audio_path.display()
        );

        Ok(ChunkTranscription {
            text: parsed.text,
            entries,
        })
    }
}

impl TranscriptionProvider for OpenAiWhisperProvider {
    fn name(&self) -> &'static str {
        "OpenAI Whisper API"
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkTranscription, ApiCallError>> + Send + 'a>> {
        Box::pin(self.request(audio_path))
    }
}
