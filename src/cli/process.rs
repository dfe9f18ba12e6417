//! CLI handler for processing recordings.
//!
//! Each file is processed in turn; a failure on one is reported with its
//! filename and reason and does not stop the rest.

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::error;

use crate::cli::Cli;
use crate::config::Config;
use crate::pipeline;

pub async fn handle_process_command(cli: &Cli, config: &Config) -> Result<()> {
    let total = cli.files.len();
    let mut failed = 0;

    for file in &cli.files {
        eprintln!("Processing {}", file.display());

        let pb = create_progress_bar();
        let outcome = pipeline::process_recording(config, file, Some(&pb)).await;
        pb.finish_and_clear();

        match outcome {
            Ok(outcome) => {
                eprintln!("  transcript: {}", outcome.transcript_path.display());
                eprintln!("  tasks:      {}", outcome.tasks_path.display());
            }
            Err(err) => {
                // a summarization failure still leaves the transcript artifact
                // on disk; the error says which stage gave up
                error!("{}: {}", file.display(), err);
                eprintln!("  failed: {}", err);
                failed += 1;
            }
        }
        eprintln!();
    }

    eprintln!("Processed {}/{} recordings", total - failed, total);
    if failed > 0 {
        bail!("{} of {} recordings failed", failed, total);
    }

    Ok(())
}

/// Spinner showing the current pipeline stage.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
