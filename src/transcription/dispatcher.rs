//! Bounded-parallel transcription dispatch.
//!
//! A fixed number of workers consume chunks from a shared queue, so at most
//! `parallelism` requests are in flight at any moment. Results are collected
//! keyed by chunk index; completion order does not matter. Once a chunk is
//! dispatched it runs to completion or exhausts its retry budget; there is
//! no cancellation.

use anyhow::{anyhow, Result};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::providers::TranscriptionProvider;
use crate::media::chunker::Chunk;
use crate::retry::RetryPolicy;
use crate::transcript::TranscriptSegment;

/// Transcribe every chunk, returning segments keyed by chunk index.
///
/// Any chunk that fails all its attempts fails the whole recording; partial
/// transcripts are never returned.
pub async fn transcribe_chunks(
    provider: Arc<dyn TranscriptionProvider>,
    policy: RetryPolicy,
    chunks: &[Chunk],
    parallelism: usize,
    progress: Option<&ProgressBar>,
) -> Result<BTreeMap<usize, TranscriptSegment>> {
    let total = chunks.len();
    if total == 0 {
        return Ok(BTreeMap::new());
    }

    let workers = parallelism.max(1).min(total);
    info!(
        "transcribing {} chunk(s) with {} parallel worker(s) via {}",
        total,
        workers,
        provider.name()
    );

    let queue = Arc::new(Mutex::new(chunks.to_vec().into_iter()));
    let (result_tx, mut result_rx) = mpsc::channel::<(usize, Result<TranscriptSegment>)>(total);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = queue.clone();
        let provider = provider.clone();
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let chunk = { queue.lock().await.next() };
                let Some(chunk) = chunk else { break };

                debug!("worker {} picked up chunk {}", worker_id, chunk.index);
                let label = format!("transcription of chunk {}", chunk.index + 1);
                let provider = provider.as_ref();
                let path = chunk.path.as_path();
                let result = policy
                    .run(&label, move || provider.transcribe(path))
                    .await
                    .map(|transcription| TranscriptSegment {
                        chunk_index: chunk.index,
                        entries: transcription.into_entries(),
                    });

                if result_tx.send((chunk.index, result)).await.is_err() {
                    // collector gone, nothing left to report to
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut segments = BTreeMap::new();
    let mut failures: BTreeMap<usize, anyhow::Error> = BTreeMap::new();
    let mut completed = 0;
    while let Some((index, result)) = result_rx.recv().await {
        completed += 1;
        if let Some(pb) = progress {
            pb.set_message(format!("Transcribing... {}/{}", completed, total));
        }
        match result {
            Ok(segment) => {
                info!("completed transcription {}/{}", completed, total);
                segments.insert(index, segment);
            }
            Err(err) => {
                warn!("chunk {} failed: {:#}", index + 1, err);
                failures.insert(index, err);
            }
        }
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| anyhow!("transcription worker panicked: {}", e))?;
    }

    // report the lowest-indexed failure; the rest were logged above
    if let Some((index, err)) = failures.into_iter().next() {
        return Err(err.context(format!("chunk {} could not be transcribed", index + 1)));
    }

    Ok(segments)
}
