//! Voice Activity Detection (VAD).
//!
//! Labels each frame as speech or silence using RMS-based thresholding.
//! Classification is a pure function of the frame contents; all segmentation
//! state lives in [`crate::audio::segmenter::SegmentAccumulator`].

/// Label attached to a frame by the classifier. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLabel {
    /// Frame energy is above the speech threshold.
    Speech,
    /// Frame energy is at or below the speech threshold.
    Silence,
}

/// Classifies a frame of samples as speech or silence.
///
/// Pure and deterministic: identical input always yields the same label,
/// which keeps synthetic-frame tests exact.
pub fn classify(samples: &[i16], speech_threshold: f32) -> FrameLabel {
    if calculate_rms(samples) > speech_threshold {
        FrameLabel::Speech
    } else {
        FrameLabel::Silence
    }
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value in 0.0..=1.0, where 0.0 is silence,
/// ~0.707 a full-scale sine wave, and 1.0 maximum amplitude.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}
