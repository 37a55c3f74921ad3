//! Audio capture, classification and segmentation.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod frame;
pub mod listener;
pub mod segmenter;
pub mod source;
pub mod vad;
pub mod wav;
