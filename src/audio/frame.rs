//! Fixed-duration audio frames, the atomic unit of capture and classification.

/// A fixed-duration chunk of mono 16-bit PCM samples.
///
/// Frames are immutable once captured; the classifier and the accumulator
/// only ever borrow or consume them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioFrame {
    /// Creates a new frame from captured samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The PCM samples of this frame.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Consumes the frame, returning its sample buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of this frame in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        (self.samples.len() as u64 * 1000 / self.sample_rate as u64) as u32
    }

    /// Number of samples a frame of `frame_ms` holds at `sample_rate`.
    pub fn samples_per_frame(sample_rate: u32, frame_ms: u32) -> usize {
        (sample_rate as u64 * frame_ms as u64 / 1000) as usize
    }
}
