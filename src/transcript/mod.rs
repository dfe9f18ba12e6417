//! Transcript assembly.
//!
//! Per-chunk transcription results carry timestamps local to their chunk;
//! assembly shifts them by the chunk's start offset and merges everything
//! onto one continuous timeline.

use anyhow::{bail, Result};
use std::collections::BTreeMap;

use crate::media::chunker::Chunk;

/// One timestamped line of transcript text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    /// Seconds from the start of the owning timeline.
    pub timestamp: f64,
    pub text: String,
}

/// Transcription of a single chunk, timestamps local to the chunk.
#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    pub chunk_index: usize,
    pub entries: Vec<TranscriptEntry>,
}

/// Full transcript of a recording, immutable once assembled.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattened text without timestamps, for the summarization prompt.
    pub fn plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One `[HH:MM:SS] text` paragraph per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}", format_timestamp(e.timestamp), e.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Merge per-chunk segments into one transcript.
///
/// Every chunk must have a segment in `segments`; a missing index is an
/// internal error. Entries come out in chunk-index order with local order
/// preserved within each chunk, timestamps shifted to the recording
/// timeline.
pub fn assemble(chunks: &[Chunk], mut segments: BTreeMap<usize, TranscriptSegment>) -> Result<Transcript> {
    let mut entries = Vec::new();

    for chunk in chunks {
        let Some(segment) = segments.remove(&chunk.index) else {
            bail!("missing transcription result for chunk {}", chunk.index);
        };
        for entry in segment.entries {
            entries.push(TranscriptEntry {
                timestamp: entry.timestamp + chunk.start_offset,
                text: entry.text,
            });
        }
    }

    Ok(Transcript { entries })
}

/// Format seconds as `[HH:MM:SS]`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "[{:02}:{:02}:{:02}]",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn chunk(index: usize, start_offset: f64) -> Chunk {
        Chunk {
            index,
            start_offset,
            end_offset: start_offset + 300.0,
            path: PathBuf::from(format!("/tmp/chunk{}.wav", index)),
        }
    }

    fn segment(chunk_index: usize, timestamps: &[f64]) -> TranscriptSegment {
        TranscriptSegment {
            chunk_index,
            entries: timestamps
                .iter()
                .map(|&t| TranscriptEntry {
                    timestamp: t,
                    text: format!("entry at {}", t),
                })
                .collect(),
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "[00:00:00]");
        assert_eq!(format_timestamp(61.5), "[00:01:01]");
        assert_eq!(format_timestamp(3661.0), "[01:01:01]");
        assert_eq!(format_timestamp(7325.9), "[02:02:05]");
    }

    #[test]
    fn test_assemble_single_chunk_is_identity() {
        let chunks = vec![chunk(0, 0.0)];
        let mut segments = BTreeMap::new();
        segments.insert(0, segment(0, &[0.0, 10.0, 20.0]));

        let transcript = assemble(&chunks, segments).unwrap();
        let timestamps: Vec<f64> = transcript.entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_assemble_offsets_timestamps_by_chunk_start() {
        let chunks = vec![chunk(0, 0.0), chunk(1, 300.0), chunk(2, 600.0)];
        let mut segments = BTreeMap::new();
        for c in &chunks {
            segments.insert(c.index, segment(c.index, &[0.0, 10.0, 20.0]));
        }

        let transcript = assemble(&chunks, segments).unwrap();
        let timestamps: Vec<f64> = transcript.entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(
            timestamps,
            vec![0.0, 10.0, 20.0, 300.0, 310.0, 320.0, 600.0, 610.0, 620.0]
        );
    }

    #[test]
    fn test_assemble_orders_by_chunk_index_not_insertion() {
        let chunks = vec![chunk(0, 0.0), chunk(1, 300.0)];
        // insert out of order, as concurrent completion would
        let mut segments = BTreeMap::new();
        segments.insert(1, segment(1, &[5.0]));
        segments.insert(0, segment(0, &[5.0]));

        let transcript = assemble(&chunks, segments).unwrap();
        let timestamps: Vec<f64> = transcript.entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![5.0, 305.0]);
    }

    #[test]
    fn test_assemble_missing_chunk_is_fatal() {
        let chunks = vec![chunk(0, 0.0), chunk(1, 300.0)];
        let mut segments = BTreeMap::new();
        segments.insert(0, segment(0, &[0.0]));

        let err = assemble(&chunks, segments).unwrap_err();
        assert!(err.to_string().contains("chunk 1"));
    }

    #[test]
    fn test_render_prefixes_timestamps() {
        let chunks = vec![chunk(0, 3600.0)];
        let mut segments = BTreeMap::new();
        segments.insert(
            0,
            TranscriptSegment {
                chunk_index: 0,
                entries: vec![TranscriptEntry {
                    timestamp: 0.0,
                    text: "hello world".to_string(),
                }],
            },
        );

        let transcript = assemble(&chunks, segments).unwrap();
        assert_eq!(transcript.render(), "[01:00:00] hello world");
    }

    #[test]
    fn test_plain_text_joins_entries() {
        let chunks = vec![chunk(0, 0.0)];
        let mut segments = BTreeMap::new();
        segments.insert(
            0,
            TranscriptSegment {
                chunk_index: 0,
                entries: vec![
                    TranscriptEntry {
                        timestamp: 0.0,
                        text: "first".to_string(),
                    },
                    TranscriptEntry {
                        timestamp: 5.0,
                        text: "second".to_string(),
                    },
                ],
            },
        );

        let transcript = assemble(&chunks, segments).unwrap();
        assert_eq!(transcript.plain_text(), "first\nsecond");
        assert!(!transcript.is_empty());
    }
}
