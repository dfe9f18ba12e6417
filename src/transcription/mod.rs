//! Transcription of chunked recordings against an external
//! speech-to-text service.

pub mod dispatcher;
pub mod providers;

pub use dispatcher::transcribe_chunks;
pub use providers::{ChunkTranscription, OpenAiWhisperProvider, TranscriptionProvider};
