use crate::artifact::SegmentArtifact;
use crate::defaults;
use crate::error::{ParloError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One timed piece of recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedText {
    /// Offset from segment start, in milliseconds.
    pub start_ms: u32,
    /// End offset from segment start, in milliseconds.
    pub end_ms: u32,
    /// Recognized text for this span.
    pub text: String,
}

/// Transcription result for one persisted utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub segments: Vec<TimedText>,
}

impl Transcript {
    /// Concatenate all spans into one string, trimmed.
    pub fn text(&self) -> String {
        let joined = self
            .segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        joined.trim().to_string()
    }

    /// True when no span carries any text.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
/// Implementations read the persisted WAV artifact rather than raw samples,
/// which keeps the cycle pipeline uniform for any backend.
pub trait Transcriber: Send + Sync {
    /// Transcribe a persisted utterance into timed text.
    fn transcribe(&self, artifact: &SegmentArtifact) -> Result<Transcript>;

    /// Get the name of the loaded model.
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready.
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across cycles.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, artifact: &SegmentArtifact) -> Result<Transcript> {
        (**self).transcribe(artifact)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Configuration for transcriber initialization.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    pub model_path: PathBuf,
    pub language: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::DEFAULT_MODEL),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Mock transcriber for testing.
///
/// Clones share the call counter, so a clone kept by the test observes
/// calls made through the one handed to the pipeline.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of transcribe calls across all clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Configure the mock to return a specific response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, artifact: &SegmentArtifact) -> Result<Transcript> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.should_fail {
            Err(ParloError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(Transcript {
                segments: vec![TimedText {
                    start_ms: 0,
                    end_ms: artifact.duration_ms(),
                    text: self.response.clone(),
                }],
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::SegmentPersister;
    use crate::audio::frame::AudioFrame;
    use crate::audio::segmenter::{SegmentAccumulator, SegmenterConfig};
    use crate::audio::vad::FrameLabel;

    fn make_artifact(dir: &std::path::Path) -> SegmentArtifact {
        let config = SegmenterConfig {
            silence_duration_ms: 30,
            min_speech_ms: 30,
            pre_roll_ms: 0,
            flush_on_stop: true,
        };
        let mut acc = SegmentAccumulator::new(16000, config);
        for _ in 0..4 {
            acc.push(AudioFrame::new(vec![1000i16; 480], 16000), FrameLabel::Speech);
        }
        let segment = acc.finish().unwrap();
        SegmentPersister::new(dir).persist(&segment).unwrap()
    }

    #[test]
    fn test_transcript_text_joins_segments() {
        let transcript = Transcript {
            segments: vec![
                TimedText {
                    start_ms: 0,
                    end_ms: 500,
                    text: " Hello".to_string(),
                },
                TimedText {
                    start_ms: 500,
                    end_ms: 1000,
                    text: "world. ".to_string(),
                },
            ],
        };
        assert_eq!(transcript.text(), "Hello world.");
    }

    #[test]
    fn test_transcript_skips_blank_segments() {
        let transcript = Transcript {
            segments: vec![
                TimedText {
                    start_ms: 0,
                    end_ms: 200,
                    text: "  ".to_string(),
                },
                TimedText {
                    start_ms: 200,
                    end_ms: 400,
                    text: "ok".to_string(),
                },
            ],
        };
        assert_eq!(transcript.text(), "ok");
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_transcript_empty_when_all_blank() {
        let transcript = Transcript {
            segments: vec![TimedText {
                start_ms: 0,
                end_ms: 100,
                text: "   ".to_string(),
            }],
        };
        assert!(transcript.is_empty());
        assert_eq!(transcript.text(), "");
    }

    #[test]
    fn test_default_transcript_is_empty() {
        assert!(Transcript::default().is_empty());
    }

    #[test]
    fn test_mock_transcriber_returns_response() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = make_artifact(dir.path());
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");

        let transcript = transcriber.transcribe(&artifact).unwrap();
        assert_eq!(transcript.text(), "Hello, this is a test");
        assert_eq!(transcript.segments[0].end_ms, artifact.duration_ms());
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = make_artifact(dir.path());
        let transcriber = MockTranscriber::new("test-model").with_failure();

        match transcriber.transcribe(&artifact) {
            Err(ParloError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            _ => panic!("Expected Transcription error"),
        }
    }

    #[test]
    fn test_mock_transcriber_counts_calls_across_clones() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = make_artifact(dir.path());

        let transcriber = MockTranscriber::new("counted").with_failure();
        let probe = transcriber.clone();

        assert_eq!(probe.call_count(), 0);
        let _ = transcriber.transcribe(&artifact);
        let _ = transcriber.transcribe(&artifact);
        assert_eq!(probe.call_count(), 2);
    }

    #[test]
    fn test_mock_transcriber_model_name() {
        let transcriber = MockTranscriber::new("whisper-base");
        assert_eq!(transcriber.model_name(), "whisper-base");
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        assert!(MockTranscriber::new("test-model").is_ready());
        assert!(!MockTranscriber::new("test-model").with_failure().is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = make_artifact(dir.path());

        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.model_name(), "test-model");
        assert!(transcriber.is_ready());
        assert_eq!(transcriber.transcribe(&artifact).unwrap().text(), "boxed test");
    }

    #[test]
    fn test_arc_transcriber_shares_across_threads() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = make_artifact(dir.path());

        let transcriber = Arc::new(MockTranscriber::new("shared").with_response("from arc"));
        let clone = Arc::clone(&transcriber);

        assert_eq!(clone.transcribe(&artifact).unwrap().text(), "from arc");
        assert_eq!(transcriber.model_name(), "shared");
    }

    #[test]
    fn test_transcriber_config_default() {
        let config = TranscriberConfig::default();
        assert_eq!(config.model_path, PathBuf::from(defaults::DEFAULT_MODEL));
        assert_eq!(config.language, "auto");
    }
}
