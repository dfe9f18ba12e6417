//! Time-based chunking of oversized recordings.
//!
//! Recordings above the configured size limit are split into consecutive
//! time-bounded slices so each upload stays under the API's request cap.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::media::{file_size, run_tool};

/// A contiguous time-bounded slice of a recording.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in the recording; assembly order is by this index.
    pub index: usize,
    /// Seconds into the original recording where this chunk starts.
    pub start_offset: f64,
    pub end_offset: f64,
    pub path: PathBuf,
}

/// How many chunks a recording needs and how long each runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkPlan {
    pub num_chunks: usize,
    pub chunk_duration: f64,
}

/// Chunk sizing for `size` bytes of audio spanning `duration` seconds.
///
/// Chunks target 90% of the size limit so time-based cuts keep a margin
/// under the cap.
pub fn plan_chunks(size: u64, duration: f64, size_limit: u64) -> ChunkPlan {
    if size <= size_limit {
        return ChunkPlan {
            num_chunks: 1,
            chunk_duration: duration,
        };
    }

    let target = size_limit as f64 * 0.9;
    let num_chunks = (size as f64 / target).ceil() as usize;
    ChunkPlan {
        num_chunks,
        chunk_duration: duration / num_chunks as f64,
    }
}

/// Split `wav` into chunks under `work_dir` according to the size limit.
///
/// A recording already under the limit yields a single implicit chunk
/// pointing at the input file itself, with no ffmpeg invocation.
pub async fn create_chunks(
    wav: &Path,
    duration: f64,
    size_limit: u64,
    work_dir: &Path,
) -> Result<Vec<Chunk>> {
    let size = file_size(wav)?;
    let plan = plan_chunks(size, duration, size_limit);

    if plan.num_chunks == 1 {
        info!(
            "file size {:.2}MB within limit, no chunking needed",
            size as f64 / 1024.0 / 1024.0
        );
        return Ok(vec![Chunk {
            index: 0,
            start_offset: 0.0,
            end_offset: duration,
            path: wav.to_path_buf(),
        }]);
    }

    info!(
        "file size {:.2}MB exceeds limit, splitting into {} chunks",
        size as f64 / 1024.0 / 1024.0,
        plan.num_chunks
    );

    let mut chunks = Vec::with_capacity(plan.num_chunks);
    for i in 0..plan.num_chunks {
        let start = i as f64 * plan.chunk_duration;
        let end = ((i + 1) as f64 * plan.chunk_duration).min(duration);
        let path = work_dir.join(format!("chunk{:04}.wav", i));

        // Stream copy keeps the cut cheap; split points are best-effort and
        // may land mid-word.
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-i")
            .arg(wav)
            .args(["-ss", &start.to_string(), "-to", &end.to_string()])
            .args(["-c", "copy", "-y"])
            .arg(&path);
        run_tool(&mut cmd, "ffmpeg").await?;

        debug!(
            "created chunk {}/{}: {:.2}s to {:.2}s",
            i + 1,
            plan.num_chunks,
            start,
            end
        );
        chunks.push(Chunk {
            index: i,
            start_offset: start,
            end_offset: end,
            path,
        });
    }

    Ok(chunks)
}
