//! WAV file frame source for offline input.

use crate::audio::frame::AudioFrame;
use crate::audio::source::FrameSource;
use crate::error::{ParloError, Result};
use std::io::Read;
use std::path::Path;

/// Frame source that reads from WAV file data.
/// Supports arbitrary source rates and channels, resampling to the
/// requested pipeline rate in mono. Delivers fixed-duration frames and
/// reports `None` at end of file.
pub struct WavFrameSource {
    samples: Vec<i16>,
    position: usize,
    sample_rate: u32,
    frame_samples: usize,
}

impl WavFrameSource {
    /// Create from any reader (for testing/flexibility), delivering
    /// `frame_ms` frames at `sample_rate`.
    pub fn from_reader(
        reader: Box<dyn Read + Send>,
        sample_rate: u32,
        frame_ms: u32,
    ) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| ParloError::AudioCapture {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = wav_reader.spec();
        let source_rate = spec.sample_rate;
        let source_channels = spec.channels;

        let raw_samples: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ParloError::AudioCapture {
                message: format!("Failed to read WAV samples: {}", e),
            })?;

        // Convert to mono if stereo
        let mono_samples = if source_channels == 2 {
            raw_samples
                .chunks_exact(2)
                .map(|chunk| {
                    let left = chunk[0] as i32;
                    let right = chunk[1] as i32;
                    ((left + right) / 2) as i16
                })
                .collect()
        } else {
            raw_samples
        };

        // Resample to the pipeline rate if needed
        let samples = if source_rate != sample_rate {
            resample(&mono_samples, source_rate, sample_rate)
        } else {
            mono_samples
        };

        Ok(Self {
            samples,
            position: 0,
            sample_rate,
            frame_samples: AudioFrame::samples_per_frame(sample_rate, frame_ms),
        })
    }

    /// Open a WAV file from disk.
    pub fn from_path(path: &Path, sample_rate: u32, frame_ms: u32) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| ParloError::AudioCapture {
            message: format!("Failed to open WAV file {}: {}", path.display(), e),
        })?;
        Self::from_reader(Box::new(file), sample_rate, frame_ms)
    }
}

impl FrameSource for WavFrameSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<AudioFrame>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = std::cmp::min(self.position + self.frame_samples, self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(AudioFrame::new(chunk, self.sample_rate)))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
