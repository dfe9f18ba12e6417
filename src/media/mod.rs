//! Media probing and format handling.
//!
//! All media work is delegated to ffmpeg/ffprobe. This module classifies
//! inputs by extension, probes durations, and converts everything to WAV
//! before chunking and upload.

pub mod chunker;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

pub const AUDIO_FORMATS: &[&str] = &["wav", "mp3", "m4a", "flac", "aac", "ogg", "wma"];
pub const VIDEO_FORMATS: &[&str] = &["mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Classify a recording by file extension.
pub fn media_kind(path: &Path) -> Result<MediaKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if AUDIO_FORMATS.contains(&ext.as_str()) {
        Ok(MediaKind::Audio)
    } else if VIDEO_FORMATS.contains(&ext.as_str()) {
        Ok(MediaKind::Video)
    } else {
        bail!(
            "unsupported format: .{}\nSupported formats: {}",
            ext,
            supported_formats_list()
        );
    }
}

pub fn supported_formats_list() -> String {
    let mut formats: Vec<&str> = AUDIO_FORMATS
        .iter()
        .chain(VIDEO_FORMATS.iter())
        .copied()
        .collect();
    formats.sort_unstable();
    formats.join(", ")
}

/// Check that ffmpeg and ffprobe are on PATH.
pub fn check_ffmpeg_available() -> Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        which::which(tool).map_err(|_| {
            anyhow::anyhow!(
                "{} not found in PATH. Install ffmpeg:\n\
                 - macOS: brew install ffmpeg\n\
                 - Ubuntu/Debian: sudo apt install ffmpeg\n\
                 - Windows: https://ffmpeg.org/download.html",
                tool
            )
        })?;
    }
    Ok(())
}

pub fn file_size(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to read metadata for {}", path.display()))?;
    Ok(metadata.len())
}

/// Duration of a media file in seconds, via ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-i")
        .arg(path)
        .args(["-show_entries", "format=duration", "-v", "quiet", "-of", "csv=p=0"])
        .output()
        .await
        .context("failed to run ffprobe")?;

    if !output.status.success() {
        bail!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = stdout
        .trim()
        .parse()
        .with_context(|| format!("could not parse duration from ffprobe output {:?}", stdout.trim()))?;

    debug!("probed duration of {}: {:.2}s", path.display(), duration);
    Ok(duration)
}

/// Extract the audio track of a video file into a WAV under `work_dir`.
pub async fn extract_audio(video: &Path, work_dir: &Path) -> Result<PathBuf> {
    let output = work_dir.join("extracted.wav");
    info!("extracting audio: {} -> {}", video.display(), output.display());

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(video)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar", "44100", "-ac", "2", "-y"])
        .arg(&output);
    run_tool(&mut cmd, "ffmpeg").await?;

    Ok(output)
}

/// Convert an audio file to WAV at the transcription sample rate.
pub async fn convert_to_wav(audio: &Path, work_dir: &Path) -> Result<PathBuf> {
    let output = work_dir.join("converted.wav");
    info!("converting: {} -> {}", audio.display(), output.display());

    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(audio)
        .args(["-ar", "44100", "-y"])
        .arg(&output);
    run_tool(&mut cmd, "ffmpeg").await?;

    Ok(output)
}

/// Run an external media tool to completion, failing on non-zero exit.
pub(crate) async fn run_tool(cmd: &mut Command, tool: &str) -> Result<()> {
    let output = cmd
        .output()
        .await
        .with_context(|| format!("failed to run {}", tool))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            tool,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}
