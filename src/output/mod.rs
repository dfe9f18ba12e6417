//! Output artifacts.
//!
//! Each recording produces two files in the output directory: a plain-text
//! transcript with timestamps and a Markdown task report. Existing artifacts
//! with the same name are overwritten.

use anyhow::{Context, Result};
use chrono::Local;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::summary::TaskReport;
use crate::transcript::Transcript;

/// Derive a filesystem-safe base name from the recording's filename.
pub fn artifact_base_name(recording: &Path) -> String {
    let stem = recording
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording");

    let cleaned = Regex::new(r"[^\w\-]+").unwrap().replace_all(stem, "_");
    let collapsed = Regex::new(r"_+").unwrap().replace_all(&cleaned, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        "recording".to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn transcript_path(&self, base: &str) -> PathBuf {
        self.output_dir.join(format!("{}_transcription.txt", base))
    }

    pub fn tasks_path(&self, base: &str) -> PathBuf {
        self.output_dir.join(format!("{}_tasks.md", base))
    }

    pub fn write_transcript(
        &self,
        recording: &Path,
        base: &str,
        duration: f64,
        transcript: &Transcript,
    ) -> Result<PathBuf> {
        let path = self.transcript_path(base);
        let mut content = header(&format!("Transcription of {}", display_name(recording)), recording, duration);
        content.push_str(&transcript.render());
        content.push('\n');

        self.write(&path, &content)?;
        info!("transcription saved to {}", path.display());
        Ok(path)
    }

    pub fn write_task_report(
        &self,
        recording: &Path,
        base: &str,
        duration: f64,
        report: &TaskReport,
    ) -> Result<PathBuf> {
        let path = self.tasks_path(base);
        let mut content = header(&format!("Summary and Tasks - {}", display_name(recording)), recording, duration);
        content.push_str(&report.markdown);
        content.push('\n');

        self.write(&path, &content)?;
        info!("tasks and summary saved to {}", path.display());
        Ok(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("failed to create output directory {}", self.output_dir.display())
        })?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

fn display_name(recording: &Path) -> String {
    recording
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording")
        .to_string()
}

fn header(title: &str, recording: &Path, duration: f64) -> String {
    format!(
        "# {}\n\n**Source file:** {}\n**Duration:** {:.2} seconds ({:.1} minutes)\n**Processed:** {}\n\n---\n\n",
        title,
        recording.display(),
        duration,
        duration / 60.0,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
    )
}
