//! Per-recording orchestration.
//!
//! probe -> convert -> chunk -> transcribe -> assemble -> write transcript ->
//! extract tasks -> write tasks. The transcript artifact goes to disk before
//! summarization so a failed summary still leaves the transcript behind.

use anyhow::anyhow;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::media::{self, chunker, MediaKind};
use crate::output::{artifact_base_name, OutputWriter};
use crate::summary::TaskExtractor;
use crate::transcript;
use crate::transcription::{transcribe_chunks, OpenAiWhisperProvider, TranscriptionProvider};

/// Per-recording failure, classified for user-facing reporting. A failure on
/// one recording never aborts the remaining recordings of an invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0:#}")]
    Configuration(anyhow::Error),
    #[error("media tool error: {0:#}")]
    MediaTool(anyhow::Error),
    #[error("transcription failed: {0:#}")]
    Transcription(anyhow::Error),
    #[error("summarization failed: {0:#}")]
    Summarization(anyhow::Error),
    #[error("filesystem error: {0:#}")]
    FileSystem(anyhow::Error),
}

/// Artifacts produced for one recording.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub transcript_path: PathBuf,
    pub tasks_path: PathBuf,
}

/// Run the full pipeline for a single recording.
pub async fn process_recording(
    config: &Config,
    recording: &Path,
    progress: Option<&ProgressBar>,
) -> Result<ProcessOutcome, PipelineError> {
    if !recording.exists() {
        return Err(PipelineError::FileSystem(anyhow!(
            "file not found: {}",
            recording.display()
        )));
    }

    let kind = media::media_kind(recording).map_err(PipelineError::MediaTool)?;
    media::check_ffmpeg_available().map_err(PipelineError::MediaTool)?;

    // Chunk files live here; deletion is best-effort when the dir drops.
    let work_dir = TempDir::new()
        .map_err(|e| PipelineError::FileSystem(anyhow!("failed to create temp directory: {}", e)))?;

    set_progress(progress, "Preparing audio...");
    let wav = match kind {
        MediaKind::Video => media::extract_audio(recording, work_dir.path()).await,
        MediaKind::Audio => media::convert_to_wav(recording, work_dir.path()).await,
    }
    .map_err(PipelineError::MediaTool)?;

    let duration = media::probe_duration(&wav)
        .await
        .map_err(PipelineError::MediaTool)?;
    info!("audio duration: {:.2}s ({:.1} minutes)", duration, duration / 60.0);

    set_progress(progress, "Chunking...");
    let chunks = chunker::create_chunks(&wav, duration, config.size_limit_bytes(), work_dir.path())
        .await
        .map_err(PipelineError::MediaTool)?;

    set_progress(progress, "Transcribing...");
    let provider: Arc<dyn TranscriptionProvider> = Arc::new(OpenAiWhisperProvider::new(config));
    let segments = transcribe_chunks(
        provider,
        config.retry_policy(),
        &chunks,
        config.max_parallel_tasks,
        progress,
    )
    .await
    .map_err(PipelineError::Transcription)?;

    let transcript =
        transcript::assemble(&chunks, segments).map_err(PipelineError::Transcription)?;

    set_progress(progress, "Writing transcript...");
    let writer = OutputWriter::new(&config.output_dir);
    let base = artifact_base_name(recording);
    let transcript_path = writer
        .write_transcript(recording, &base, duration, &transcript)
        .map_err(PipelineError::FileSystem)?;

    set_progress(progress, "Extracting tasks...");
    let extractor = TaskExtractor::new(config);
    let report = extractor
        .extract(&transcript.plain_text())
        .await
        .map_err(PipelineError::Summarization)?;

    let tasks_path = writer
        .write_task_report(recording, &base, duration, &report)
        .map_err(PipelineError::FileSystem)?;

    Ok(ProcessOutcome {
        transcript_path,
        tasks_path,
    })
}

fn set_progress(progress: Option<&ProgressBar>, message: &str) {
    if let Some(pb) = progress {
        pb.set_message(message.to_string());
    }
}
