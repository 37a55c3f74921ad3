//! Listening session management for voice capture.
//!
//! Ties a frame source, the classifier and the segment accumulator together
//! to deliver one complete utterance per call.

use crate::audio::segmenter::{AudioSegment, SegmentAccumulator, SegmenterConfig};
use crate::audio::source::FrameSource;
use crate::audio::vad;
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Manages the capture-classify-accumulate loop over a frame source.
///
/// One `Listener` holds the device for its entire lifetime; each call to
/// [`listen_until_silence`](Listener::listen_until_silence) returns the next
/// silence-delimited utterance.
pub struct Listener<S: FrameSource> {
    source: S,
    accumulator: SegmentAccumulator,
    speech_threshold: f32,
    shutdown: Arc<AtomicBool>,
    started: bool,
}

impl<S: FrameSource> Listener<S> {
    /// Create a new listener over `source`.
    ///
    /// The `shutdown` flag is polled between frames; setting it makes the
    /// current `listen_until_silence` call return promptly.
    pub fn new(
        source: S,
        speech_threshold: f32,
        segmenter_config: SegmenterConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let sample_rate = source.sample_rate();
        Self {
            source,
            accumulator: SegmentAccumulator::new(sample_rate, segmenter_config),
            speech_threshold,
            shutdown,
            started: false,
        }
    }

    /// Block until the next complete utterance is available.
    ///
    /// Returns `Ok(None)` when the source is exhausted (file input) or the
    /// shutdown flag was set; in both cases a partial utterance is flushed
    /// or discarded per the accumulator's `flush_on_stop` setting.
    pub fn listen_until_silence(&mut self) -> Result<Option<AudioSegment>> {
        if !self.started {
            self.source.start()?;
            self.started = true;
        }

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                return Ok(self.accumulator.finish());
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(self.accumulator.finish()),
                Err(e) => {
                    // Audio buffered before a device fault is discarded
                    self.accumulator.discard();
                    return Err(e);
                }
            };

            let label = vad::classify(frame.samples(), self.speech_threshold);
            if let Some(segment) = self.accumulator.push(frame, label) {
                return Ok(Some(segment));
            }
        }
    }

    /// Release the capture device. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.started {
            self.source.stop()?;
            self.started = false;
        }
        Ok(())
    }

    /// Whether the underlying source ends on its own.
    pub fn is_finite(&self) -> bool {
        self.source.is_finite()
    }
}
