//! Speech-to-text transcription.

pub mod transcriber;
pub mod whisper;
