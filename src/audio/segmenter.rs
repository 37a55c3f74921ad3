//! Silence-triggered segmentation of the labeled frame stream.
//!
//! [`SegmentAccumulator`] consumes (frame, label) pairs and buffers speech
//! until trailing silence exceeds the configured threshold, then emits one
//! [`AudioSegment`] per utterance. Durations are accounted in milliseconds
//! derived from frame sample counts, so the machine is fully deterministic
//! for synthetic input.

use crate::audio::frame::AudioFrame;
use crate::audio::vad::FrameLabel;
use crate::defaults;
use std::collections::VecDeque;

/// Configuration for the segment accumulator.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Trailing silence duration (ms) that finalizes an utterance.
    pub silence_duration_ms: u32,
    /// Minimum speech duration (ms); shorter runs are discarded as noise.
    pub min_speech_ms: u32,
    /// Silence kept before speech onset (ms); 0 disables pre-roll.
    pub pre_roll_ms: u32,
    /// Whether a partial utterance is emitted when the source stops.
    pub flush_on_stop: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            min_speech_ms: defaults::MIN_SPEECH_MS,
            pre_roll_ms: defaults::PRE_ROLL_MS,
            flush_on_stop: false,
        }
    }
}

/// One continuous utterance plus its trailing silence.
///
/// Owned by the accumulator until emission; ownership then transfers to the
/// persister and the in-memory buffer is released with it.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    samples: Vec<i16>,
    sample_rate: u32,
    duration_ms: u32,
    speech_ms: u32,
}

impl AudioSegment {
    /// The PCM samples of the full segment (speech plus buffered silence).
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total buffered duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Duration of speech-labeled frames in milliseconds.
    pub fn speech_ms(&self) -> u32 {
        self.speech_ms
    }
}

/// Frames buffered for the utterance currently being accumulated.
#[derive(Debug, Default)]
struct SegmentBuffer {
    samples: Vec<i16>,
    frames: usize,
    total_ms: u32,
    speech_ms: u32,
}

impl SegmentBuffer {
    fn append(&mut self, frame: AudioFrame, label: FrameLabel) {
        let ms = frame.duration_ms();
        self.total_ms += ms;
        if label == FrameLabel::Speech {
            self.speech_ms += ms;
        }
        self.frames += 1;
        self.samples.extend_from_slice(frame.samples());
    }
}

/// Accumulator state. The buffered data travels with the variant, so an
/// emitted or discarded utterance cannot leak into the next one.
#[derive(Debug)]
enum AccumulatorState {
    /// No speech seen yet.
    Idle,
    /// Speech detected, frames being buffered.
    Recording { buffer: SegmentBuffer },
    /// Silence after speech, counting toward end-of-utterance.
    TrailingSilence { buffer: SegmentBuffer, silence_ms: u32 },
}

impl AccumulatorState {
    fn name(&self) -> &'static str {
        match self {
            AccumulatorState::Idle => "idle",
            AccumulatorState::Recording { .. } => "recording",
            AccumulatorState::TrailingSilence { .. } => "trailing_silence",
        }
    }
}

/// State machine that turns a labeled frame stream into audio segments.
///
/// At most one segment is being accumulated at any time.
pub struct SegmentAccumulator {
    config: SegmenterConfig,
    sample_rate: u32,
    state: AccumulatorState,
    pre_roll: VecDeque<AudioFrame>,
    pre_roll_held_ms: u32,
}

impl SegmentAccumulator {
    /// Creates an accumulator for frames at `sample_rate`.
    pub fn new(sample_rate: u32, config: SegmenterConfig) -> Self {
        Self {
            config,
            sample_rate,
            state: AccumulatorState::Idle,
            pre_roll: VecDeque::new(),
            pre_roll_held_ms: 0,
        }
    }

    /// Feeds one labeled frame; returns a finalized segment when the
    /// trailing-silence threshold is reached.
    pub fn push(&mut self, frame: AudioFrame, label: FrameLabel) -> Option<AudioSegment> {
        let state = std::mem::replace(&mut self.state, AccumulatorState::Idle);

        let (next, emitted) = match (state, label) {
            (AccumulatorState::Idle, FrameLabel::Silence) => {
                self.retain_pre_roll(frame);
                (AccumulatorState::Idle, None)
            }
            (AccumulatorState::Idle, FrameLabel::Speech) => {
                let mut buffer = SegmentBuffer::default();
                for pre in self.pre_roll.drain(..) {
                    buffer.append(pre, FrameLabel::Silence);
                }
                self.pre_roll_held_ms = 0;
                buffer.append(frame, FrameLabel::Speech);
                (AccumulatorState::Recording { buffer }, None)
            }
            (AccumulatorState::Recording { mut buffer }, FrameLabel::Speech) => {
                buffer.append(frame, FrameLabel::Speech);
                (AccumulatorState::Recording { buffer }, None)
            }
            (AccumulatorState::Recording { mut buffer }, FrameLabel::Silence) => {
                let silence_ms = frame.duration_ms();
                buffer.append(frame, FrameLabel::Silence);
                (
                    AccumulatorState::TrailingSilence { buffer, silence_ms },
                    None,
                )
            }
            // A brief pause within an utterance does not end it.
            (AccumulatorState::TrailingSilence { mut buffer, .. }, FrameLabel::Speech) => {
                buffer.append(frame, FrameLabel::Speech);
                (AccumulatorState::Recording { buffer }, None)
            }
            (
                AccumulatorState::TrailingSilence { mut buffer, silence_ms },
                FrameLabel::Silence,
            ) => {
                if silence_ms >= self.config.silence_duration_ms {
                    let emitted = self.finalize(buffer);
                    self.retain_pre_roll(frame);
                    (AccumulatorState::Idle, emitted)
                } else {
                    let silence_ms = silence_ms + frame.duration_ms();
                    buffer.append(frame, FrameLabel::Silence);
                    (
                        AccumulatorState::TrailingSilence { buffer, silence_ms },
                        None,
                    )
                }
            }
        };

        self.state = next;
        emitted
    }

    /// Flushes the machine when the source stops.
    ///
    /// An utterance that never reached the silence threshold is emitted only
    /// when `flush_on_stop` is set (and the minimum-speech floor is met);
    /// otherwise it is discarded. Returns the machine to idle either way.
    pub fn finish(&mut self) -> Option<AudioSegment> {
        self.pre_roll.clear();
        self.pre_roll_held_ms = 0;

        match std::mem::replace(&mut self.state, AccumulatorState::Idle) {
            AccumulatorState::Idle => None,
            AccumulatorState::Recording { buffer }
            | AccumulatorState::TrailingSilence { buffer, .. } => {
                if self.config.flush_on_stop {
                    self.finalize(buffer)
                } else {
                    None
                }
            }
        }
    }

    /// Drops any partially accumulated utterance and buffered pre-roll,
    /// returning the machine to idle.
    pub fn discard(&mut self) {
        self.pre_roll.clear();
        self.pre_roll_held_ms = 0;
        self.state = AccumulatorState::Idle;
    }

    /// Name of the current state, for status reporting.
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// True when no utterance is being accumulated.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, AccumulatorState::Idle)
    }

    fn finalize(&self, buffer: SegmentBuffer) -> Option<AudioSegment> {
        debug_assert!(buffer.frames > 0, "finalizing an empty buffer");
        if buffer.speech_ms < self.config.min_speech_ms {
            // Too short to be an utterance; drop the buffer as noise.
            return None;
        }
        Some(AudioSegment {
            samples: buffer.samples,
            sample_rate: self.sample_rate,
            duration_ms: buffer.total_ms,
            speech_ms: buffer.speech_ms,
        })
    }

    fn retain_pre_roll(&mut self, frame: AudioFrame) {
        if self.config.pre_roll_ms == 0 {
            return;
        }
        self.pre_roll_held_ms += frame.duration_ms();
        self.pre_roll.push_back(frame);
        while self.pre_roll_held_ms > self.config.pre_roll_ms {
            match self.pre_roll.pop_front() {
                Some(dropped) => self.pre_roll_held_ms -= dropped.duration_ms(),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 16000;
    const FRAME_MS: u32 = 30;
    const FRAME_SAMPLES: usize = 480;

    fn speech_frame() -> AudioFrame {
        AudioFrame::new(vec![3000i16; FRAME_SAMPLES], SAMPLE_RATE)
    }

    fn silence_frame() -> AudioFrame {
        AudioFrame::new(vec![0i16; FRAME_SAMPLES], SAMPLE_RATE)
    }

    /// Config with durations expressed in frame counts and pre-roll off,
    /// so emitted segment sizes are exact.
    fn frame_config(silence_frames: u32, min_speech_frames: u32) -> SegmenterConfig {
        SegmenterConfig {
            silence_duration_ms: silence_frames * FRAME_MS,
            min_speech_ms: min_speech_frames * FRAME_MS,
            pre_roll_ms: 0,
            flush_on_stop: false,
        }
    }

    fn push_n(
        acc: &mut SegmentAccumulator,
        n: usize,
        label: FrameLabel,
    ) -> Vec<AudioSegment> {
        let mut emitted = Vec::new();
        for _ in 0..n {
            let frame = match label {
                FrameLabel::Speech => speech_frame(),
                FrameLabel::Silence => silence_frame(),
            };
            if let Some(seg) = acc.push(frame, label) {
                emitted.push(seg);
            }
        }
        emitted
    }

    #[test]
    fn test_emits_speech_run_plus_silence_up_to_threshold() {
        // [SILENCE×5, SPEECH×10, SILENCE×(threshold+2)] with threshold=3
        // → exactly one segment of 10+3=13 frames.
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 5));

        assert!(push_n(&mut acc, 5, FrameLabel::Silence).is_empty());
        assert!(push_n(&mut acc, 10, FrameLabel::Speech).is_empty());
        let emitted = push_n(&mut acc, 5, FrameLabel::Silence);

        assert_eq!(emitted.len(), 1);
        let segment = &emitted[0];
        assert_eq!(segment.samples().len(), 13 * FRAME_SAMPLES);
        assert_eq!(segment.duration_ms(), 13 * FRAME_MS);
        assert_eq!(segment.speech_ms(), 10 * FRAME_MS);
        assert!(acc.is_idle());
    }

    #[test]
    fn test_short_speech_discarded_as_noise() {
        // 2 speech frames with a 5-frame minimum → nothing emitted.
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 5));

        assert!(push_n(&mut acc, 2, FrameLabel::Speech).is_empty());
        let emitted = push_n(&mut acc, 10, FrameLabel::Silence);

        assert!(emitted.is_empty());
        assert!(acc.is_idle());
    }

    #[test]
    fn test_brief_gap_does_not_terminate_segment() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(4, 1));

        push_n(&mut acc, 5, FrameLabel::Speech);
        // 2 silence frames < 4-frame threshold, then speech resumes
        assert!(push_n(&mut acc, 2, FrameLabel::Silence).is_empty());
        assert!(push_n(&mut acc, 5, FrameLabel::Speech).is_empty());
        let emitted = push_n(&mut acc, 6, FrameLabel::Silence);

        // Single segment containing both speech runs and the gap:
        // 5 speech + 2 gap + 5 speech + 4 trailing = 16 frames
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].samples().len(), 16 * FRAME_SAMPLES);
        assert_eq!(emitted[0].speech_ms(), 10 * FRAME_MS);
    }

    #[test]
    fn test_silence_counter_resets_after_resumed_speech() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 1));

        push_n(&mut acc, 3, FrameLabel::Speech);
        push_n(&mut acc, 2, FrameLabel::Silence);
        push_n(&mut acc, 1, FrameLabel::Speech);
        // Counter restarted: 2 more silence frames must not finalize yet
        assert!(push_n(&mut acc, 2, FrameLabel::Silence).is_empty());
        let emitted = push_n(&mut acc, 2, FrameLabel::Silence);
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn test_pure_silence_emits_nothing() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 1));
        assert!(push_n(&mut acc, 50, FrameLabel::Silence).is_empty());
        assert!(acc.is_idle());
    }

    #[test]
    fn test_consecutive_utterances_are_separate_segments() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 2));

        let mut emitted = Vec::new();
        emitted.extend(push_n(&mut acc, 5, FrameLabel::Speech));
        emitted.extend(push_n(&mut acc, 6, FrameLabel::Silence));
        emitted.extend(push_n(&mut acc, 4, FrameLabel::Speech));
        emitted.extend(push_n(&mut acc, 6, FrameLabel::Silence));

        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].samples().len(), 8 * FRAME_SAMPLES);
        assert_eq!(emitted[1].samples().len(), 7 * FRAME_SAMPLES);
    }

    #[test]
    fn test_finish_discards_partial_utterance_by_default() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 1));
        push_n(&mut acc, 4, FrameLabel::Speech);
        assert!(acc.finish().is_none());
        assert!(acc.is_idle());
    }

    #[test]
    fn test_finish_flushes_partial_utterance_when_enabled() {
        let mut config = frame_config(3, 1);
        config.flush_on_stop = true;
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, config);

        push_n(&mut acc, 4, FrameLabel::Speech);
        let segment = acc.finish().expect("flush_on_stop should emit");
        assert_eq!(segment.samples().len(), 4 * FRAME_SAMPLES);
        assert!(acc.is_idle());
    }

    #[test]
    fn test_finish_flush_still_honors_minimum_speech() {
        // [SPEECH×2] with a 5-frame minimum → nothing even with flush enabled.
        let mut config = frame_config(3, 5);
        config.flush_on_stop = true;
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, config);

        push_n(&mut acc, 2, FrameLabel::Speech);
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_finish_when_idle_returns_none() {
        let mut config = frame_config(3, 1);
        config.flush_on_stop = true;
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, config);
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_pre_roll_prepended_on_speech_onset() {
        let mut config = frame_config(3, 1);
        config.pre_roll_ms = 2 * FRAME_MS;
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, config);

        // 5 idle silence frames; only the last 2 should be retained
        push_n(&mut acc, 5, FrameLabel::Silence);
        push_n(&mut acc, 4, FrameLabel::Speech);
        let emitted = push_n(&mut acc, 4, FrameLabel::Silence);

        // 2 pre-roll + 4 speech + 3 trailing = 9 frames
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].samples().len(), 9 * FRAME_SAMPLES);
        // Pre-roll counts toward duration but not toward speech
        assert_eq!(emitted[0].speech_ms(), 4 * FRAME_MS);
    }

    #[test]
    fn test_discard_drops_buffered_audio() {
        let mut config = frame_config(3, 1);
        config.flush_on_stop = true;
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, config);

        push_n(&mut acc, 4, FrameLabel::Speech);
        acc.discard();

        assert!(acc.is_idle());
        // Flushing afterwards has nothing to emit
        assert!(acc.finish().is_none());

        // A fresh utterance contains only its own frames
        push_n(&mut acc, 3, FrameLabel::Speech);
        let emitted = push_n(&mut acc, 4, FrameLabel::Silence);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].samples().len(), 6 * FRAME_SAMPLES);
    }

    #[test]
    fn test_state_names_track_transitions() {
        let mut acc = SegmentAccumulator::new(SAMPLE_RATE, frame_config(3, 1));
        assert_eq!(acc.state_name(), "idle");

        acc.push(speech_frame(), FrameLabel::Speech);
        assert_eq!(acc.state_name(), "recording");

        acc.push(silence_frame(), FrameLabel::Silence);
        assert_eq!(acc.state_name(), "trailing_silence");

        acc.push(speech_frame(), FrameLabel::Speech);
        assert_eq!(acc.state_name(), "recording");
    }
}
