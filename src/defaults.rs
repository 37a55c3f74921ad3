//! Default configuration constants for parlo.
//!
//! Shared constants used across configuration types to keep the capture,
//! segmentation and transcription stages in agreement.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default capture frame duration in milliseconds.
///
/// 30ms frames are the atomic unit of classification and segmentation.
pub const FRAME_MS: u32 = 30;

/// Default Voice Activity Detection (VAD) threshold.
///
/// RMS-based threshold (0.0 to 1.0) above which a frame counts as speech.
/// 0.02 is tuned for typical microphone input levels.
pub const VAD_THRESHOLD: f32 = 0.02;

/// Default trailing silence duration in milliseconds before an utterance
/// is considered finished.
///
/// 1500ms allows for natural pauses in speech without prematurely cutting
/// the utterance.
pub const SILENCE_DURATION_MS: u32 = 1500;

/// Default minimum speech duration in milliseconds.
///
/// Accumulated audio with less speech than this is discarded as noise
/// instead of being handed to transcription.
pub const MIN_SPEECH_MS: u32 = 300;

/// Default pre-roll duration in milliseconds.
///
/// Silence frames kept while idle and prepended when speech starts, so soft
/// onsets (plosives, fricatives) that precede the threshold crossing are not
/// clipped.
pub const PRE_ROLL_MS: u32 = 300;

/// Default Whisper model path.
pub const DEFAULT_MODEL: &str = "models/ggml-base.bin";

/// Default transcription language code.
///
/// "auto" lets Whisper detect the spoken language automatically.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default translation engine identifier.
pub const DEFAULT_ENGINE: &str = "gpt";

/// Default source language for translation.
pub const DEFAULT_SOURCE_LANG: &str = "en";

/// Default target language for translation.
pub const DEFAULT_TARGET_LANG: &str = "pt";

/// Default timeout for translation HTTP requests, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Idle sleep while waiting for the capture callback to deliver samples.
pub const CAPTURE_POLL_MS: u64 = 10;

/// How long a capture stream may deliver nothing before the read fails.
pub const CAPTURE_STALL_TIMEOUT_MS: u64 = 5000;

/// Report the GPU backend compiled into this build.
///
/// Only one GPU backend can be active at a time; if none is enabled,
/// returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else {
        "CPU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_duration_divides_evenly_into_silence_threshold() {
        assert_eq!(SILENCE_DURATION_MS % FRAME_MS, 0);
    }

    #[test]
    fn gpu_backend_matches_compiled_feature() {
        let expected = if cfg!(feature = "cuda") {
            "CUDA"
        } else if cfg!(feature = "vulkan") {
            "Vulkan"
        } else {
            "CPU"
        };
        assert_eq!(gpu_backend(), expected);
    }
}
