use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::retry::ApiCallError;
use crate::transcript::TranscriptEntry;

pub mod openai_whisper;

pub use openai_whisper::OpenAiWhisperProvider;

/// Raw transcription of one chunk, before timeline correction.
#[derive(Debug, Clone)]
pub struct ChunkTranscription {
    /// Full text of the chunk.
    pub text: String,
    /// Timestamped entries local to the chunk. Empty when the service did
    /// not return segment timing.
    pub entries: Vec<TranscriptEntry>,
}

impl ChunkTranscription {
    /// Entries ready for assembly. Falls back to a single entry at local
    /// time zero when the service returned no segment timing.
    pub fn into_entries(self) -> Vec<TranscriptEntry> {
        if !self.entries.is_empty() {
            return self.entries;
        }
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Vec::new();
        }
        vec![TranscriptEntry {
            timestamp: 0.0,
            text,
        }]
    }
}

pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkTranscription, ApiCallError>> + Send + 'a>>;
}

/// MIME type for a media file extension, used for multipart uploads.
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        "flac" => Some("audio/flac"),
        "aac" => Some("audio/aac"),
        "ogg" => Some("audio/ogg"),
        "wma" => Some("audio/x-ms-wma"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "mkv" => Some("video/x-matroska"),
        "wmv" => Some("video/x-ms-wmv"),
        "flv" => Some("video/x-flv"),
        "webm" => Some("video/webm"),
        "m4v" => Some("video/x-m4v"),
        _ => None,
    }
}
