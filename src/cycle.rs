//! Per-utterance processing: persist, transcribe, translate.
//!
//! One cycle handles exactly one segment. The WAV artifact lives only for
//! the duration of the cycle; its Drop removes the file on every exit path,
//! including early error returns.

use crate::audio::segmenter::AudioSegment;
use crate::artifact::SegmentPersister;
use crate::error::ParloError;
use crate::stt::transcriber::{Transcriber, Transcript};
use crate::translate::translator::Translator;
use std::time::Instant;

/// Outcome of one completed cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Recognized text with timing spans.
    pub transcript: Transcript,
    /// Translated text, when the transcript was non-empty and the engine
    /// succeeded.
    pub translation: Option<String>,
    /// Translation failure, reported alongside the transcript instead of
    /// discarding it.
    pub translation_error: Option<String>,
    /// Duration of the captured audio in milliseconds.
    pub audio_ms: u32,
    pub persist_ms: u64,
    pub transcribe_ms: u64,
    pub translate_ms: u64,
}

impl CycleReport {
    /// Total processing time, excluding capture.
    pub fn total_ms(&self) -> u64 {
        self.persist_ms + self.transcribe_ms + self.translate_ms
    }
}

/// A failed cycle, carrying the stage timings measured before the failure.
///
/// Stages that never ran report zero.
#[derive(Debug)]
pub struct CycleFailure {
    pub error: ParloError,
    pub audio_ms: u32,
    pub persist_ms: u64,
    pub transcribe_ms: u64,
}

impl CycleFailure {
    /// Whether the loop should continue after this failure.
    pub fn is_cycle_scoped(&self) -> bool {
        self.error.is_cycle_scoped()
    }
}

/// Runs the persist-transcribe-translate pipeline for each segment.
pub struct CycleOrchestrator {
    persister: SegmentPersister,
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn Translator>,
    source_language: String,
    target_language: String,
}

impl CycleOrchestrator {
    pub fn new(
        persister: SegmentPersister,
        transcriber: Box<dyn Transcriber>,
        translator: Box<dyn Translator>,
        source_language: String,
        target_language: String,
    ) -> Self {
        Self {
            persister,
            transcriber,
            translator,
            source_language,
            target_language,
        }
    }

    /// Process one utterance end to end.
    ///
    /// Persist and transcription failures abort the cycle; the timings
    /// measured up to the failing stage travel with the error so the
    /// failure can still be reported with them. A translation failure
    /// does not abort: the transcript survives and the failure is carried
    /// in the report. An empty transcript skips translation entirely.
    pub async fn process_segment(
        &mut self,
        segment: AudioSegment,
    ) -> std::result::Result<CycleReport, CycleFailure> {
        let audio_ms = segment.duration_ms();

        let persist_start = Instant::now();
        let artifact = match self.persister.persist(&segment) {
            Ok(artifact) => artifact,
            Err(error) => {
                return Err(CycleFailure {
                    error,
                    audio_ms,
                    persist_ms: persist_start.elapsed().as_millis() as u64,
                    transcribe_ms: 0,
                });
            }
        };
        let persist_ms = persist_start.elapsed().as_millis() as u64;

        let transcribe_start = Instant::now();
        let transcript = match self.transcriber.transcribe(&artifact) {
            Ok(transcript) => transcript,
            Err(error) => {
                return Err(CycleFailure {
                    error,
                    audio_ms,
                    persist_ms,
                    transcribe_ms: transcribe_start.elapsed().as_millis() as u64,
                });
            }
        };
        let transcribe_ms = transcribe_start.elapsed().as_millis() as u64;

        let mut translation = None;
        let mut translation_error = None;
        let mut translate_ms = 0;

        let text = transcript.text();
        if !text.is_empty() {
            let translate_start = Instant::now();
            match self
                .translator
                .translate(&text, &self.source_language, &self.target_language)
                .await
            {
                Ok(translated) => translation = Some(translated),
                Err(e) => translation_error = Some(e.to_string()),
            }
            translate_ms = translate_start.elapsed().as_millis() as u64;
        }

        // `artifact` drops here, removing the WAV file.
        Ok(CycleReport {
            transcript,
            translation,
            translation_error,
            audio_ms,
            persist_ms,
            transcribe_ms,
            translate_ms,
        })
    }

    /// Engine name for status output.
    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    /// Model name for status output.
    pub fn model_name(&self) -> &str {
        self.transcriber.model_name()
    }
}
