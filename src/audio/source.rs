use crate::audio::frame::AudioFrame;
use crate::defaults;
use crate::error::{ParloError, Result};

/// Trait for audio frame sources.
///
/// This trait allows swapping implementations (real audio device, WAV file,
/// or mock). A source delivers fixed-duration mono PCM frames once started.
pub trait FrameSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// Must be idempotent: stopping an already-stopped source is a no-op.
    fn stop(&mut self) -> Result<()>;

    /// Read the next frame from the source.
    ///
    /// Blocks until a full frame is available. Returns `Ok(None)` when a
    /// finite source (a file) is exhausted; live sources never return `None`.
    fn next_frame(&mut self) -> Result<Option<AudioFrame>>;

    /// Sample rate of delivered frames, in Hz.
    fn sample_rate(&self) -> u32;

    /// Whether this source ends on its own (file input) or runs until
    /// stopped (live capture).
    fn is_finite(&self) -> bool {
        false
    }
}

/// Mock frame source for testing.
///
/// Plays back a scripted sequence of frames, then reports exhaustion.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    is_started: bool,
    frames: Vec<AudioFrame>,
    position: usize,
    sample_rate: u32,
    should_fail_start: bool,
    should_fail_read: bool,
    fail_read_at: Option<usize>,
    error_message: String,
}

impl MockFrameSource {
    /// Create a new mock with an empty script.
    pub fn new() -> Self {
        Self {
            is_started: false,
            frames: Vec::new(),
            position: 0,
            sample_rate: defaults::SAMPLE_RATE,
            should_fail_start: false,
            should_fail_read: false,
            fail_read_at: None,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Append one frame to the playback script.
    pub fn with_frame(mut self, frame: AudioFrame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Append a run of identical constant-amplitude frames.
    pub fn with_constant_frames(mut self, count: usize, amplitude: i16, frame_samples: usize) -> Self {
        for _ in 0..count {
            self.frames
                .push(AudioFrame::new(vec![amplitude; frame_samples], self.sample_rate));
        }
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on the next read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the mock to fail once, just before delivering frame `index`.
    pub fn with_read_failure_at(mut self, index: usize) -> Self {
        self.fail_read_at = Some(index);
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// Number of frames not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.position)
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockFrameSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(ParloError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<AudioFrame>> {
        if self.should_fail_read {
            return Err(ParloError::DeviceRead {
                message: self.error_message.clone(),
            });
        }
        if self.fail_read_at == Some(self.position) {
            self.fail_read_at = None;
            return Err(ParloError::DeviceRead {
                message: self.error_message.clone(),
            });
        }
        match self.frames.get(self.position) {
            Some(frame) => {
                self.position += 1;
                Ok(Some(frame.clone()))
            }
            None => Ok(None),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_finite(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_plays_scripted_frames_in_order() {
        let mut source = MockFrameSource::new()
            .with_frame(AudioFrame::new(vec![1i16; 480], 16000))
            .with_frame(AudioFrame::new(vec![2i16; 480], 16000));
        source.start().unwrap();

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.samples()[0], 1);
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.samples()[0], 2);
    }

    #[test]
    fn test_mock_reports_exhaustion_with_none() {
        let mut source = MockFrameSource::new().with_constant_frames(2, 100, 480);
        source.start().unwrap();

        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
        // Stays exhausted
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_mock_start_failure() {
        let mut source = MockFrameSource::new()
            .with_start_failure()
            .with_error_message("device busy");

        match source.start() {
            Err(ParloError::AudioCapture { message }) => assert_eq!(message, "device busy"),
            other => panic!("Expected AudioCapture error, got {:?}", other.is_ok()),
        }
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_read_failure_is_device_read() {
        let mut source = MockFrameSource::new()
            .with_constant_frames(3, 100, 480)
            .with_read_failure();
        source.start().unwrap();

        match source.next_frame() {
            Err(ParloError::DeviceRead { message }) => {
                assert_eq!(message, "mock audio error");
            }
            _ => panic!("Expected DeviceRead error"),
        }
    }

    #[test]
    fn test_mock_one_shot_read_failure_then_recovers() {
        let mut source = MockFrameSource::new()
            .with_constant_frames(3, 100, 480)
            .with_read_failure_at(1);
        source.start().unwrap();

        assert!(source.next_frame().unwrap().is_some());
        assert!(matches!(
            source.next_frame(),
            Err(ParloError::DeviceRead { .. })
        ));
        // Reads resume where the script left off
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_mock_stop_is_idempotent() {
        let mut source = MockFrameSource::new();
        source.start().unwrap();
        assert!(source.is_started());

        assert!(source.stop().is_ok());
        assert!(source.stop().is_ok());
        assert!(!source.is_started());
    }

    #[test]
    fn test_mock_is_finite() {
        let source = MockFrameSource::new();
        assert!(source.is_finite());
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut source = MockFrameSource::new().with_constant_frames(3, 0, 480);
        assert_eq!(source.remaining(), 3);
        source.next_frame().unwrap();
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_trait_is_object_safe() {
        let mut source: Box<dyn FrameSource> =
            Box::new(MockFrameSource::new().with_constant_frames(1, 5, 480));

        assert!(source.start().is_ok());
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.samples().len(), 480);
        assert!(source.stop().is_ok());
    }
}
