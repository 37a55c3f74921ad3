//! Segment persistence as temporary WAV artifacts.
//!
//! Each utterance is written to disk before transcription and deleted once
//! the cycle ends, whatever the outcome. Deletion is tied to Drop so every
//! exit path, including early returns on error, releases the file.

use crate::audio::segmenter::AudioSegment;
use crate::error::{ParloError, Result};
use std::path::{Path, PathBuf};

/// Writes utterances to numbered WAV files in a working directory.
pub struct SegmentPersister {
    dir: PathBuf,
    seq: u64,
}

impl SegmentPersister {
    /// Create a persister writing into `dir`. The directory must exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), seq: 0 }
    }

    /// Create a persister over the OS temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Write `segment` as a mono 16-bit WAV file.
    ///
    /// The file is written to a `.part` path first and renamed into place,
    /// so a crash mid-write never leaves a half-written artifact at the
    /// final path. Persisting the same segment twice yields identical audio
    /// content under distinct names.
    pub fn persist(&mut self, segment: &AudioSegment) -> Result<SegmentArtifact> {
        self.seq += 1;
        let name = format!("parlo-segment-{}-{}.wav", std::process::id(), self.seq);
        let final_path = self.dir.join(&name);
        let part_path = self.dir.join(format!("{}.part", name));

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: segment.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let write_result = (|| -> Result<()> {
            let mut writer =
                hound::WavWriter::create(&part_path, spec).map_err(|e| ParloError::Persist {
                    message: format!("Failed to create WAV file: {}", e),
                })?;
            for &sample in segment.samples() {
                writer.write_sample(sample).map_err(|e| ParloError::Persist {
                    message: format!("Failed to write WAV sample: {}", e),
                })?;
            }
            writer.finalize().map_err(|e| ParloError::Persist {
                message: format!("Failed to finalize WAV file: {}", e),
            })
        })();

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&part_path);
            return Err(e);
        }

        std::fs::rename(&part_path, &final_path).map_err(|e| {
            let _ = std::fs::remove_file(&part_path);
            ParloError::Persist {
                message: format!("Failed to move WAV file into place: {}", e),
            }
        })?;

        Ok(SegmentArtifact {
            path: final_path,
            duration_ms: segment.duration_ms(),
            sample_rate: segment.sample_rate(),
        })
    }
}

/// A persisted utterance on disk. Removes its file on drop.
#[derive(Debug)]
pub struct SegmentArtifact {
    path: PathBuf,
    duration_ms: u32,
    sample_rate: u32,
}

impl SegmentArtifact {
    /// Path of the WAV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Duration of the persisted audio in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Sample rate of the persisted audio in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for SegmentArtifact {
    fn drop(&mut self) {
        // The artifact may already be gone if the filesystem was cleaned
        // externally; a failed removal here is not worth surfacing.
        let _ = std::fs::remove_file(&self.path);
    }
}
